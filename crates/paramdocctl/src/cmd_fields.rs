use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::common;

pub fn run(tables: Option<PathBuf>, json: bool) -> Result<()> {
    let tables = common::load_tables(tables.as_deref())?;
    info!(count = tables.fields.len(), "recognized fields");

    if json {
        let names: Vec<&str> = tables.fields.iter().collect();
        return common::print_json(&names);
    }

    if tables.fields.is_empty() {
        println!("No recognized fields.");
        return Ok(());
    }
    for name in tables.fields.iter() {
        println!("{name}");
    }
    Ok(())
}
