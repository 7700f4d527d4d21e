#![cfg_attr(docsrs, feature(doc_cfg))]
//! Emit documented parameter metadata as a machine readable XML document.
//!
//! The emitter writes the XML preamble as soon as it is created, accumulates
//! one `parameters` sub-tree per group and serializes the whole document once
//! on [`MetadataEmitter::close`]:
//!
//! ```text
//! paramfile
//! ├── vehicles
//! │   └── parameters name=…
//! │       └── param name=… [humanName documentation user calibration]
//! │           ├── field name=…
//! │           └── values
//! │               └── value code=…
//! └── libraries
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use param_meta::{
    is_values_list, parse_values_list, MetaError, Parameter, ParameterGroup, Tables,
    DESCRIPTION, DISPLAY_NAME, NAME, UNITS, USER, VALUES,
};
use quick_xml::Writer;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace, warn};

mod tree;

pub use tree::Element;

/// Declaration and provenance comment written before any structured content.
pub const PREAMBLE: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
<!-- Dynamically generated list of documented parameters (generated by param_parse.py) -->\n";

/// Conventional output file name.
pub const DEFAULT_FILE_NAME: &str = "apm.pdef.xml";

/// Field name carrying the expanded unit text next to `Units`.
pub const UNIT_TEXT: &str = "UnitText";

const INDENT_SIZE: usize = 2;

/// Fields consumed as `param` attributes and never emitted as `field` nodes.
const ATTRIBUTE_FIELDS: &[&str] = &[NAME, DISPLAY_NAME, DESCRIPTION, USER];

#[derive(Debug, Error)]
pub enum EmitError {
    /// A `Values` list entry lacks exactly one `:` separator.
    #[error("malformed values entry '{0}': expected exactly one ':'")]
    MalformedValueList(String),
    /// A `Units` abbreviation is absent from the unit table.
    #[error("unknown unit abbreviation: {0}")]
    UnknownUnit(String),
    /// Comment text would break well-formedness.
    #[error("invalid comment: {0}")]
    InvalidComment(String),
    #[error("xml: {0}")]
    Xml(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl From<MetaError> for EmitError {
    fn from(err: MetaError) -> Self {
        match err {
            MetaError::MalformedValueList(entry) => EmitError::MalformedValueList(entry),
            MetaError::UnknownUnit(abbr) => EmitError::UnknownUnit(abbr),
            MetaError::Json(msg) => EmitError::Xml(format!("metadata json: {msg}")),
        }
    }
}

pub(crate) fn xml_err<E: std::fmt::Display>(err: E) -> EmitError {
    EmitError::Xml(err.to_string())
}

/// Top-level section receiving emitted groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Vehicles,
    Libraries,
}

impl Section {
    pub const fn element_name(self) -> &'static str {
        match self {
            Section::Vehicles => "vehicles",
            Section::Libraries => "libraries",
        }
    }

    const fn index(self) -> usize {
        match self {
            Section::Vehicles => 0,
            Section::Libraries => 1,
        }
    }
}

/// Counters reported when the document is closed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmitStats {
    pub vehicle_groups: usize,
    pub library_groups: usize,
    pub params: usize,
    pub comments: usize,
}

/// Builds the `paramfile` document and writes it to a sink.
///
/// The sink receives the preamble on construction, raw comments as they are
/// emitted and the serialized tree on [`close`](Self::close). Closing consumes
/// the emitter, so no emission is possible afterwards.
pub struct MetadataEmitter<W: Write> {
    sink: W,
    tables: Tables,
    root: Element,
    section: Section,
    stats: EmitStats,
}

impl MetadataEmitter<BufWriter<File>> {
    /// Create (or truncate) `path` and write the preamble to it.
    pub fn create<P: AsRef<Path>>(path: P, tables: Tables) -> Result<Self, EmitError> {
        let path = path.as_ref();
        let file = File::create(path)?;
        debug!(path = %path.display(), "opened parameter xml output");
        Self::new(BufWriter::new(file), tables)
    }
}

impl<W: Write> MetadataEmitter<W> {
    pub fn new(mut sink: W, tables: Tables) -> Result<Self, EmitError> {
        sink.write_all(PREAMBLE.as_bytes())?;
        let mut root = Element::new("paramfile");
        root.append(Section::Vehicles.element_name());
        root.append(Section::Libraries.element_name());
        Ok(Self {
            sink,
            tables,
            root,
            section: Section::Vehicles,
            stats: EmitStats::default(),
        })
    }

    /// Section that the next [`emit`](Self::emit) appends to.
    pub fn section(&self) -> Section {
        self.section
    }

    /// Target the `libraries` section from now on.
    pub fn start_libraries(&mut self) {
        if self.section != Section::Libraries {
            debug!("switching emission to libraries");
        }
        self.section = Section::Libraries;
    }

    /// Write `<!-- text -->` straight to the sink, outside the tree.
    ///
    /// Text containing `--` cannot appear inside an XML comment and is
    /// rejected with [`EmitError::InvalidComment`]; nothing is written then.
    pub fn emit_comment(&mut self, text: &str) -> Result<(), EmitError> {
        if text.contains("--") {
            return Err(EmitError::InvalidComment(text.to_string()));
        }
        write!(self.sink, "<!-- {text} -->")?;
        self.stats.comments += 1;
        Ok(())
    }

    /// Append one `parameters` sub-tree for `group` under the current section.
    ///
    /// On error nothing is appended; the document keeps every group emitted
    /// before the failing one.
    pub fn emit(&mut self, group: &ParameterGroup) -> Result<(), EmitError> {
        let mut parameters = Element::new("parameters");
        parameters.set_attribute("name", group.name.as_str());
        for param in &group.params {
            let node = self.param_element(param).map_err(|err| {
                warn!(group = %group.name, param = %param.name, %err, "aborting group emission");
                err
            })?;
            parameters.push(node);
        }

        let section = self.section;
        self.root.children_mut()[section.index()].push(parameters);
        match section {
            Section::Vehicles => self.stats.vehicle_groups += 1,
            Section::Libraries => self.stats.library_groups += 1,
        }
        self.stats.params += group.params.len();
        debug!(
            group = %group.name,
            params = group.params.len(),
            section = section.element_name(),
            "emitted parameter group"
        );
        Ok(())
    }

    fn param_element(&self, param: &Parameter) -> Result<Element, EmitError> {
        let mut node = Element::new("param");
        if let Some(human) = param.display_name() {
            node.set_attribute("humanName", human);
        }
        node.set_attribute("name", param.name.as_str());
        if let Some(doc) = param.description() {
            node.set_attribute("documentation", doc);
        }
        if let Some(user) = param.user() {
            node.set_attribute("user", user);
        }
        if let Some(calibration) = param.calibration() {
            node.set_attribute("calibration", calibration);
        }

        for (key, value) in param.fields() {
            if ATTRIBUTE_FIELDS.iter().any(|f| *f == key) || !self.tables.fields.contains(key) {
                trace!(param = %param.name, field = key, "skipping field");
                continue;
            }
            match key {
                VALUES if is_values_list(value) => {
                    let entries = parse_values_list(value)?;
                    let values = node.append("values");
                    for entry in entries {
                        let item = values.append("value");
                        item.set_attribute("code", entry.code);
                        item.set_text(entry.label);
                    }
                }
                UNITS => {
                    if value.is_empty() {
                        continue;
                    }
                    let text = self.tables.units.lookup(value)?;
                    push_field(&mut node, UNITS, value);
                    push_field(&mut node, UNIT_TEXT, text);
                }
                _ => push_field(&mut node, key, value),
            }
        }

        // Keeps `</param>` on its own line instead of a self-closed element.
        if node.is_empty() {
            node.set_text("\n");
        }
        Ok(node)
    }

    /// The document accumulated so far.
    pub fn document(&self) -> &Element {
        &self.root
    }

    /// Serialize the document after the preamble, flush and release the sink.
    pub fn close(self) -> Result<EmitStats, EmitError> {
        let (_sink, stats) = self.finish_into_inner()?;
        Ok(stats)
    }

    /// Like [`close`](Self::close) but hands the flushed sink back.
    pub fn finish_into_inner(mut self) -> Result<(W, EmitStats), EmitError> {
        {
            let mut writer = Writer::new_with_indent(&mut self.sink, b' ', INDENT_SIZE);
            self.root.write_to(&mut writer)?;
        }
        self.sink.write_all(b"\n")?;
        self.sink.flush()?;
        debug!(
            vehicle_groups = self.stats.vehicle_groups,
            library_groups = self.stats.library_groups,
            params = self.stats.params,
            "closed parameter xml document"
        );
        Ok((self.sink, self.stats))
    }
}

fn push_field(node: &mut Element, name: &str, text: &str) {
    let field = node.append("field");
    field.set_attribute("name", name);
    field.set_text(text);
}
