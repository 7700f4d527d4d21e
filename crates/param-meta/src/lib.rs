#![cfg_attr(docsrs, feature(doc_cfg))]
//! Documented parameter metadata: groups, parameters and their named fields.
//!
//! The model is produced by an upstream documentation parser and consumed by
//! the emitters. Field order is significant and preserved end to end.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::trace;

mod tables;

pub use tables::{RecognizedFields, Tables, UnitsTable};

/// Mandatory parameter identifier key.
pub const NAME: &str = "name";
/// Human readable parameter name (`DisplayName`).
pub const DISPLAY_NAME: &str = "DisplayName";
/// Free-form parameter documentation (`Description`).
pub const DESCRIPTION: &str = "Description";
/// User category such as `Standard` or `Advanced` (`User`).
pub const USER: &str = "User";
/// Calibration marker (`Calibration`).
pub const CALIBRATION: &str = "Calibration";
/// Enumerated `code:label` list (`Values`).
pub const VALUES: &str = "Values";
/// Abbreviated unit (`Units`).
pub const UNITS: &str = "Units";

/// Error type produced while building or loading metadata.
#[derive(Debug, Error)]
pub enum MetaError {
    /// A `Values` entry did not split into exactly one code and one label.
    #[error("malformed values entry '{0}': expected exactly one ':'")]
    MalformedValueList(String),
    /// A `Units` abbreviation is missing from the unit table.
    #[error("unknown unit abbreviation: {0}")]
    UnknownUnit(String),
    /// JSON input could not be decoded.
    #[error("json: {0}")]
    Json(String),
}

/// Named collection of parameters, scoped to a vehicle or a shared library.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParameterGroup {
    /// Group identifier such as `ArduPlane` or `BATT_`.
    pub name: String,
    /// Parameters in emission order.
    #[serde(default)]
    pub params: Vec<Parameter>,
}

impl ParameterGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Append a parameter, builder style.
    pub fn with_param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }
}

/// One documented parameter.
///
/// Besides the mandatory `name`, every documented attribute is kept in a
/// single ordered mapping. The well-known attributes (`DisplayName`,
/// `Description`, `User`, `Calibration`) are looked up from that mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name, unique within its group.
    pub name: String,
    fields: Vec<(String, String)>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Set a field, builder style.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_field(key, value);
        self
    }

    /// Set a field. An existing key keeps its position and takes the new value.
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn display_name(&self) -> Option<&str> {
        self.field(DISPLAY_NAME)
    }

    pub fn description(&self) -> Option<&str> {
        self.field(DESCRIPTION)
    }

    pub fn user(&self) -> Option<&str> {
        self.field(USER)
    }

    pub fn calibration(&self) -> Option<&str> {
        self.field(CALIBRATION)
    }
}

impl<'de> Deserialize<'de> for Parameter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ParameterVisitor)
    }
}

struct ParameterVisitor;

impl<'de> Visitor<'de> for ParameterVisitor {
    type Value = Parameter;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a parameter object with a string 'name' and string fields")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut name: Option<String> = None;
        let mut fields: Vec<(String, String)> = Vec::new();
        while let Some((key, value)) = map.next_entry::<String, String>()? {
            if key == NAME {
                if name.is_some() {
                    return Err(de::Error::duplicate_field(NAME));
                }
                name = Some(value);
            } else if let Some(slot) = fields.iter_mut().find(|(k, _)| *k == key) {
                slot.1 = value;
            } else {
                fields.push((key, value));
            }
        }
        let name = name.ok_or_else(|| de::Error::missing_field(NAME))?;
        Ok(Parameter { name, fields })
    }
}

/// Vehicle and library groups as supplied by the upstream parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GroupSet {
    #[serde(default)]
    pub vehicles: Vec<ParameterGroup>,
    #[serde(default)]
    pub libraries: Vec<ParameterGroup>,
}

impl GroupSet {
    /// Decode a group set from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, MetaError> {
        let set: GroupSet =
            serde_json::from_str(json).map_err(|err| MetaError::Json(err.to_string()))?;
        trace!(
            vehicles = set.vehicles.len(),
            libraries = set.libraries.len(),
            "decoded group set"
        );
        Ok(set)
    }

    pub fn param_count(&self) -> usize {
        self.vehicles
            .iter()
            .chain(self.libraries.iter())
            .map(|g| g.params.len())
            .sum()
    }
}

/// One `code:label` pair of an enumerated parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueEntry {
    pub code: String,
    pub label: String,
}

fn values_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(-?\w+:\w+)+,*").expect("values list pattern is a valid regex")
    })
}

/// Whether `text` starts like a comma-separated `code:label` list.
pub fn is_values_list(text: &str) -> bool {
    values_pattern().is_match(text)
}

/// Split a `code:label` list into its entries.
///
/// Entries are split on `,` and then on `:`; anything other than exactly two
/// parts is rejected. Codes and labels are kept verbatim.
pub fn parse_values_list(text: &str) -> Result<Vec<ValueEntry>, MetaError> {
    text.split(',')
        .map(|entry| {
            let mut parts = entry.split(':');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(code), Some(label), None) => Ok(ValueEntry {
                    code: code.to_string(),
                    label: label.to_string(),
                }),
                _ => Err(MetaError::MalformedValueList(entry.to_string())),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_fields_keep_order_and_overwrite_in_place() {
        let mut param = Parameter::new("FOOPARM")
            .with_field(DISPLAY_NAME, "Foo")
            .with_field("Range", "0 10")
            .with_field(UNITS, "m");
        param.set_field(DISPLAY_NAME, "Foo Parameter");

        let keys: Vec<&str> = param.fields().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![DISPLAY_NAME, "Range", UNITS]);
        assert_eq!(param.display_name(), Some("Foo Parameter"));
        assert_eq!(param.description(), None);
        assert_eq!(param.user(), None);
        assert_eq!(param.calibration(), None);
    }

    #[test]
    fn decode_group_set_preserves_field_order() {
        let json = r#"{
            "vehicles": [
                {"name": "ArduPlane", "params": [
                    {"Units": "A/s", "name": "FOOPARM", "DisplayName": "Foo Parameter", "Range": "0 5"}
                ]}
            ]
        }"#;
        let set = GroupSet::from_json(json).expect("decode");
        assert!(set.libraries.is_empty());
        assert_eq!(set.param_count(), 1);
        let param = &set.vehicles[0].params[0];
        assert_eq!(param.name, "FOOPARM");
        let keys: Vec<&str> = param.fields().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![UNITS, DISPLAY_NAME, "Range"]);
    }

    #[test]
    fn decode_rejects_missing_name() {
        let json = r#"{"libraries": [{"name": "BATT_", "params": [{"Units": "V"}]}]}"#;
        let err = GroupSet::from_json(json).expect_err("missing name");
        assert!(matches!(err, MetaError::Json(msg) if msg.contains("name")));
    }

    #[test]
    fn decode_rejects_non_string_field() {
        let json = r#"{"vehicles": [{"name": "Copter", "params": [{"name": "X", "Range": 5}]}]}"#;
        assert!(GroupSet::from_json(json).is_err());
    }

    #[test]
    fn values_list_detection() {
        assert!(is_values_list("0:Disabled,1:Enabled"));
        assert!(is_values_list("-1:Auto"));
        assert!(is_values_list(" 0:Off, 1:On"));
        assert!(!is_values_list("0 10"));
        assert!(!is_values_list(""));
        assert!(!is_values_list("Disabled or Enabled"));
    }

    #[test]
    fn parse_values_in_order() {
        let entries = parse_values_list("0:Disabled,1:Enabled,2:Auto").expect("parse");
        let pairs: Vec<(&str, &str)> = entries
            .iter()
            .map(|e| (e.code.as_str(), e.label.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("0", "Disabled"), ("1", "Enabled"), ("2", "Auto")]
        );
    }

    #[test]
    fn parse_values_rejects_bad_entries() {
        match parse_values_list("0:Off,1") {
            Err(MetaError::MalformedValueList(entry)) => assert_eq!(entry, "1"),
            other => panic!("unexpected result: {other:?}"),
        }
        match parse_values_list("0:Off,1:On:Extra") {
            Err(MetaError::MalformedValueList(entry)) => assert_eq!(entry, "1:On:Extra"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
