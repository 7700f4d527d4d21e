use std::fs;
use std::path::Path;
use std::time::SystemTime;

use anyhow::{anyhow, Context, Result};
use param_meta::{GroupSet, Tables};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::debug;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialise JSON output")?;
    println!("{text}");
    Ok(())
}

pub fn format_system_time(ts: SystemTime) -> Result<String> {
    let dt: OffsetDateTime = ts.into();
    dt.format(&Rfc3339)
        .map_err(|err| anyhow!("format timestamp: {err}"))
}

/// Built-in ArduPilot tables, optionally replaced by an override file.
pub fn load_tables(path: Option<&Path>) -> Result<Tables> {
    let Some(path) = path else {
        return Ok(Tables::ardupilot());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("read tables file {}", path.display()))?;
    let tables = Tables::from_json(&text)
        .with_context(|| format!("decode tables file {}", path.display()))?;
    debug!(
        fields = tables.fields.len(),
        units = tables.units.len(),
        "loaded tables override"
    );
    Ok(tables)
}

pub fn load_groups(path: &Path) -> Result<GroupSet> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read parameter groups {}", path.display()))?;
    GroupSet::from_json(&text).with_context(|| format!("decode parameter groups {}", path.display()))
}
