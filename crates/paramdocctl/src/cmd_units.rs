use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::common;

#[derive(Serialize)]
struct UnitEntry<'a> {
    abbreviation: &'a str,
    text: &'a str,
}

pub fn run(tables: Option<PathBuf>, json: bool) -> Result<()> {
    let tables = common::load_tables(tables.as_deref())?;
    info!(count = tables.units.len(), "unit table");

    if json {
        let entries: Vec<UnitEntry<'_>> = tables
            .units
            .iter()
            .map(|(abbreviation, text)| UnitEntry { abbreviation, text })
            .collect();
        common::print_json(&entries)?;
        return Ok(());
    }

    println!("{:<12} {}", "UNIT", "TEXT");
    for (abbreviation, text) in tables.units.iter() {
        println!("{abbreviation:<12} {text}");
    }
    Ok(())
}
