use std::io::Write;
use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::{Context, Result};
use param_meta::GroupSet;
use param_xml::{EmitStats, MetadataEmitter};
use serde::Serialize;
use tracing::info;

use crate::common;

#[derive(Debug, Clone)]
pub struct EmitArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub tables: Option<PathBuf>,
    pub comment: Option<String>,
    pub timestamp: bool,
}

#[derive(Debug, Serialize)]
struct EmitReport {
    output: String,
    #[serde(flatten)]
    stats: EmitStats,
}

pub fn run(args: EmitArgs, json: bool) -> Result<()> {
    let tables = common::load_tables(args.tables.as_deref())?;
    let groups = common::load_groups(&args.input)?;
    info!(
        vehicles = groups.vehicles.len(),
        libraries = groups.libraries.len(),
        params = groups.param_count(),
        "loaded parameter groups"
    );

    let mut comments = Vec::new();
    if let Some(comment) = args.comment {
        comments.push(comment);
    }
    if args.timestamp {
        let now = common::format_system_time(SystemTime::now())?;
        comments.push(format!("generated at {now}"));
    }

    let emitter = MetadataEmitter::create(&args.output, tables)
        .with_context(|| format!("create {}", args.output.display()))?;
    let stats = write_document(emitter, &groups, &comments)
        .with_context(|| format!("write {}", args.output.display()))?;
    info!(output = %args.output.display(), params = stats.params, "wrote parameter xml");

    if json {
        let report = EmitReport {
            output: args.output.display().to_string(),
            stats,
        };
        common::print_json(&report)?;
    } else {
        println!(
            "{}: {} vehicle groups, {} library groups, {} parameters",
            args.output.display(),
            stats.vehicle_groups,
            stats.library_groups,
            stats.params
        );
    }
    Ok(())
}

/// Comments first, then vehicles, then libraries; closes the emitter.
pub fn write_document<W: Write>(
    mut emitter: MetadataEmitter<W>,
    groups: &GroupSet,
    comments: &[String],
) -> Result<EmitStats> {
    for comment in comments {
        emitter.emit_comment(comment).context("write comment")?;
    }
    for group in &groups.vehicles {
        emitter
            .emit(group)
            .with_context(|| format!("emit vehicle group {}", group.name))?;
    }
    emitter.start_libraries();
    for group in &groups.libraries {
        emitter
            .emit(group)
            .with_context(|| format!("emit library group {}", group.name))?;
    }
    Ok(emitter.close()?)
}
