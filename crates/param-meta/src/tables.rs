//! Recognized field names and unit abbreviation tables.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use tracing::debug;

use crate::MetaError;

const ARDUPILOT_FIELDS: &[&str] = &[
    "Description",
    "DisplayName",
    "Values",
    "Range",
    "Units",
    "Increment",
    "User",
    "RebootRequired",
    "Bitmask",
    "Volatile",
    "ReadOnly",
    "Calibration",
    "Vector3Parameter",
];

const ARDUPILOT_UNITS: &[(&str, &str)] = &[
    // time
    ("ns", "nanoseconds"),
    ("us", "microseconds"),
    ("ms", "milliseconds"),
    ("s", "seconds"),
    ("min", "minutes"),
    ("h", "hours"),
    ("d", "days"),
    // distance
    ("mm", "millimeters"),
    ("cm", "centimeters"),
    ("m", "meters"),
    ("km", "kilometers"),
    // angle
    ("deg", "degrees"),
    ("cdeg", "centidegrees"),
    ("rad", "radians"),
    ("mrad", "milliradians"),
    // angular rate
    ("deg/s", "degrees per second"),
    ("cdeg/s", "centidegrees per second"),
    ("rad/s", "radians per second"),
    ("mrad/s", "milliradians per second"),
    // angular acceleration
    ("deg/s/s", "degrees per square second"),
    ("cdeg/s/s", "centidegrees per square second"),
    ("rad/s/s", "radians per square second"),
    ("mrad/s/s", "milliradians per square second"),
    // linear speed
    ("mm/s", "millimeters per second"),
    ("cm/s", "centimeters per second"),
    ("m/s", "meters per second"),
    ("km/h", "kilometers per hour"),
    // linear acceleration
    ("cm/s/s", "centimeters per square second"),
    ("m/s/s", "meters per square second"),
    // pressure
    ("Pa", "pascal"),
    ("kPa", "kilopascal"),
    ("mbar", "millibar"),
    // ratio
    ("%", "percent"),
    ("d%", "decipercent"),
    ("dB", "decibel"),
    // electrical
    ("A", "ampere"),
    ("mA", "milliampere"),
    ("A/s", "ampere per second"),
    ("A/V", "ampere per volt"),
    ("mAh", "milliampere hour"),
    ("Ah", "ampere hour"),
    ("V", "volt"),
    ("mV", "millivolt"),
    ("W", "watt"),
    ("Ohm", "ohm"),
    // magnetism
    ("gauss", "gauss"),
    ("mGauss", "milligauss"),
    // frequency
    ("Hz", "hertz"),
    ("kHz", "kilohertz"),
    ("RPM", "revolutions per minute"),
    // misc
    ("PWM", "PWM in microseconds"),
    ("degC", "degrees Celsius"),
    ("kg", "kilograms"),
    ("kB", "kilobytes"),
    ("MB", "megabytes"),
];

/// Set of field names eligible for emission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecognizedFields {
    names: BTreeSet<String>,
}

impl RecognizedFields {
    /// Field names documented by the ArduPilot parameter parser.
    pub fn ardupilot() -> Self {
        ARDUPILOT_FIELDS.iter().copied().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for RecognizedFields {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Mapping from unit abbreviation to its full text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitsTable {
    units: BTreeMap<String, String>,
}

impl UnitsTable {
    /// Unit abbreviations used throughout the ArduPilot parameter docs.
    pub fn ardupilot() -> Self {
        ARDUPILOT_UNITS.iter().copied().collect()
    }

    /// Expand an abbreviation. Missing entries are an error, never defaulted.
    pub fn lookup(&self, abbreviation: &str) -> Result<&str, MetaError> {
        self.units
            .get(abbreviation)
            .map(String::as_str)
            .ok_or_else(|| MetaError::UnknownUnit(abbreviation.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.units.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for UnitsTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            units: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Read-only lookup tables injected into an emitter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tables {
    pub fields: RecognizedFields,
    pub units: UnitsTable,
}

#[derive(Debug, Deserialize)]
struct TablesFile {
    fields: Option<Vec<String>>,
    units: Option<BTreeMap<String, String>>,
}

impl Tables {
    pub fn ardupilot() -> Self {
        Self {
            fields: RecognizedFields::ardupilot(),
            units: UnitsTable::ardupilot(),
        }
    }

    /// Decode a tables override file.
    ///
    /// Each key present in the document replaces the corresponding built-in
    /// table wholesale; absent keys keep the ArduPilot defaults.
    pub fn from_json(json: &str) -> Result<Self, MetaError> {
        let file: TablesFile =
            serde_json::from_str(json).map_err(|err| MetaError::Json(err.to_string()))?;
        let mut tables = Self::ardupilot();
        if let Some(fields) = file.fields {
            debug!(count = fields.len(), "overriding recognized fields");
            tables.fields = fields.into_iter().collect();
        }
        if let Some(units) = file.units {
            debug!(count = units.len(), "overriding unit table");
            tables.units = UnitsTable { units };
        }
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables() {
        let tables = Tables::ardupilot();
        assert!(tables.fields.contains("Values"));
        assert!(tables.fields.contains("Calibration"));
        assert!(!tables.fields.contains("name"));
        assert_eq!(tables.units.lookup("A/s").expect("A/s"), "ampere per second");
        assert_eq!(tables.units.lookup("cm/s/s").expect("cm/s/s"), "centimeters per square second");
    }

    #[test]
    fn unknown_unit_is_error() {
        let units = UnitsTable::ardupilot();
        match units.lookup("furlong/fortnight") {
            Err(MetaError::UnknownUnit(abbr)) => assert_eq!(abbr, "furlong/fortnight"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn override_file_replaces_present_tables_only() {
        let tables = Tables::from_json(r#"{"units": {"qux": "quxes"}}"#).expect("decode");
        assert_eq!(tables.units.len(), 1);
        assert_eq!(tables.units.lookup("qux").expect("qux"), "quxes");
        assert!(tables.units.lookup("m").is_err());
        assert_eq!(tables.fields, RecognizedFields::ardupilot());

        let tables = Tables::from_json(r#"{"fields": ["Range"]}"#).expect("decode");
        assert!(tables.fields.contains("Range"));
        assert!(!tables.fields.contains("Values"));
        assert_eq!(tables.units, UnitsTable::ardupilot());
    }

    #[test]
    fn override_file_rejects_garbage() {
        assert!(matches!(
            Tables::from_json("{\"fields\": 3}"),
            Err(MetaError::Json(_))
        ));
    }
}
