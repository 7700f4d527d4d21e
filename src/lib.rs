//! Parameter documentation facade re-exporting the metadata model and the
//! XML emitter.

pub use param_meta as meta;
pub use param_xml as xml;

pub use param_meta::{GroupSet, Parameter, ParameterGroup, Tables};
pub use param_xml::{EmitError, EmitStats, MetadataEmitter, Section};
