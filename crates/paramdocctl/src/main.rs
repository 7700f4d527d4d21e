use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use param_xml::DEFAULT_FILE_NAME;
use paramdocctl::cmd_emit::{self, EmitArgs};
use paramdocctl::cmd_fields;
use paramdocctl::cmd_units;

#[derive(Parser, Debug)]
#[command(name = "paramdocctl", version, about = "Parameter documentation CLI")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Output JSON where applicable
    #[arg(long)]
    json: bool,
    /// Tables override file (JSON with optional `fields` and `units`)
    #[arg(long, global = true)]
    tables: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Emit the parameter XML document from parsed groups (JSON)
    Emit {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = DEFAULT_FILE_NAME)]
        output: PathBuf,
        /// Extra comment written after the preamble
        #[arg(long)]
        comment: Option<String>,
        /// Record the generation time as a comment
        #[arg(long)]
        timestamp: bool,
    },
    /// List unit abbreviations and their expansions
    Units,
    /// List recognized field names
    Fields,
}

fn main() -> Result<()> {
    let Cli {
        verbose,
        json,
        tables,
        cmd,
    } = Cli::parse();

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| level.into()),
        ))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cmd {
        Cmd::Emit {
            input,
            output,
            comment,
            timestamp,
        } => {
            let args = EmitArgs {
                input,
                output,
                tables,
                comment,
                timestamp,
            };
            cmd_emit::run(args, json)?
        }
        Cmd::Units => cmd_units::run(tables, json)?,
        Cmd::Fields => cmd_fields::run(tables, json)?,
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_emit_defaults() {
        let cli = Cli::parse_from(["paramdocctl", "emit", "--input", "groups.json"]);
        match cli.cmd {
            Cmd::Emit {
                input,
                output,
                comment,
                timestamp,
            } => {
                assert_eq!(input, PathBuf::from("groups.json"));
                assert_eq!(output, PathBuf::from("apm.pdef.xml"));
                assert_eq!(comment, None);
                assert!(!timestamp);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn parse_global_tables_after_subcommand() {
        let cli = Cli::parse_from(["paramdocctl", "-vv", "units", "--tables", "t.json"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.tables, Some(PathBuf::from("t.json")));
        assert!(matches!(cli.cmd, Cmd::Units));
    }

    #[test]
    fn emit_requires_input() {
        assert!(Cli::try_parse_from(["paramdocctl", "emit"]).is_err());
    }
}
