pub mod cmd_emit;
pub mod cmd_fields;
pub mod cmd_units;
pub mod common;
