//! Typed frontmatter values.
//!
//! YAML is dynamically typed; queries need a closed set of shapes with
//! predictable comparison rules. Every frontmatter value is converted once,
//! at load time, into a [`FieldValue`]:
//!
//! - YAML `null` and absent keys are both [`FieldValue::Missing`]
//! - strings that parse as ISO-8601 dates become [`FieldValue::Date`]
//! - integers and floats both become [`FieldValue::Number`]
//! - mapping keys are stringified, so `1: x` is reachable as `"1"`

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use serde::{Serialize, Serializer};

/// Placeholder for values that refer back to themselves.
pub const CIRCULAR_MARKER: &str = "[circular]";

/// A single frontmatter value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Missing,
    String(String),
    Number(f64),
    Boolean(bool),
    Date(NaiveDateTime),
    List(Vec<FieldValue>),
    Mapping(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Missing => "missing",
            FieldValue::String(_) => "string",
            FieldValue::Number(_) => "number",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Date(_) => "date",
            FieldValue::List(_) => "list",
            FieldValue::Mapping(_) => "mapping",
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    /// Truthiness used by bare field tests and `!field`.
    ///
    /// Missing, `false`, `0`, empty strings, empty lists and empty mappings are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Missing => false,
            FieldValue::String(s) => !s.is_empty(),
            FieldValue::Number(n) => *n != 0.0,
            FieldValue::Boolean(b) => *b,
            FieldValue::Date(_) => true,
            FieldValue::List(items) => !items.is_empty(),
            FieldValue::Mapping(map) => !map.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Resolve a dotted path (already split into segments) below this value.
    pub fn lookup<'a>(&'a self, segments: &[&str]) -> &'a FieldValue {
        let mut current = self;
        for segment in segments {
            current = match current {
                FieldValue::Mapping(map) => map.get(*segment).unwrap_or(&MISSING),
                _ => &MISSING,
            };
        }
        current
    }

    /// Convert a parsed YAML value.
    pub fn from_yaml(value: &serde_yaml::Value) -> Self {
        use serde_yaml::Value;

        match value {
            Value::Null => FieldValue::Missing,
            Value::Bool(b) => FieldValue::Boolean(*b),
            Value::Number(n) => n.as_f64().map_or(FieldValue::Missing, FieldValue::Number),
            Value::String(s) => match parse_date(s) {
                Some(date) => FieldValue::Date(date),
                None => FieldValue::String(s.clone()),
            },
            Value::Sequence(items) => {
                FieldValue::List(items.iter().map(FieldValue::from_yaml).collect())
            }
            Value::Mapping(map) => FieldValue::Mapping(
                map.iter()
                    .filter_map(|(k, v)| yaml_key(k).map(|k| (k, FieldValue::from_yaml(v))))
                    .collect(),
            ),
            Value::Tagged(tagged) => FieldValue::from_yaml(&tagged.value),
        }
    }
}

static MISSING: FieldValue = FieldValue::Missing;

fn yaml_key(key: &serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value;

    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Missing => serializer.serialize_none(),
            FieldValue::String(s) => serializer.serialize_str(s),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => {
                serializer.serialize_i64(*n as i64)
            }
            FieldValue::Number(n) => serializer.serialize_f64(*n),
            FieldValue::Boolean(b) => serializer.serialize_bool(*b),
            FieldValue::Date(d) => serializer.serialize_str(&format_date(d)),
            FieldValue::List(items) => items.serialize(serializer),
            FieldValue::Mapping(map) => map.serialize(serializer),
        }
    }
}

/// Format a date, dropping the time part when it is midnight.
pub(crate) fn format_date(date: &NaiveDateTime) -> String {
    if date.num_seconds_from_midnight() == 0 {
        date.format("%Y-%m-%d").to_string()
    } else {
        date.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

const DATETIME_FORMATS: &[&str] =
    &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse an ISO-8601 date or date-time string.
///
/// Accepts `YYYY-MM-DD`, local date-times with `T` or space separators, and
/// RFC 3339 timestamps (kept in their written offset).
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    // Cheap reject before trying formats: must start with YYYY-MM-DD
    let bytes = s.as_bytes();
    if bytes.len() < 10
        || !bytes[..4].iter().all(u8::is_ascii_digit)
        || bytes[4] != b'-'
        || bytes[7] != b'-'
    {
        return None;
    }

    if s.len() == 10 {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0));
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local())
}

/// Parsed frontmatter of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frontmatter {
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Frontmatter {
    /// Resolve a dotted path like `project.owner.name`.
    pub fn get_path(&self, path: &str) -> &FieldValue {
        let mut segments = path.split('.');
        let Some(first) = segments.next() else {
            return &MISSING;
        };
        let rest: Vec<&str> = segments.collect();
        self.fields.get(first).map_or(&MISSING, |v| v.lookup(&rest))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> FieldValue {
        FieldValue::from_yaml(&serde_yaml::from_str::<serde_yaml::Value>(s).unwrap())
    }

    #[test]
    fn converts_scalars() {
        assert_eq!(yaml("3"), FieldValue::Number(3.0));
        assert_eq!(yaml("2.5"), FieldValue::Number(2.5));
        assert_eq!(yaml("true"), FieldValue::Boolean(true));
        assert_eq!(yaml("hello"), FieldValue::String("hello".into()));
        assert_eq!(yaml("~"), FieldValue::Missing);
    }

    #[test]
    fn date_strings_become_dates() {
        let value = yaml("2024-01-15");
        assert_eq!(value.type_name(), "date");
        assert_eq!(parse_date("2024-01-15T10:30"), parse_date("2024-01-15 10:30:00"));
        assert!(parse_date("2024-13-40").is_none());
        assert!(parse_date("not a date").is_none());
        assert!(parse_date("20240115").is_none());
    }

    #[test]
    fn rfc3339_is_accepted() {
        let date = parse_date("2024-03-01T08:00:00+02:00").unwrap();
        assert_eq!(format_date(&date), "2024-03-01T08:00:00");
    }

    #[test]
    fn dotted_lookup_walks_mappings() {
        let mut fm = Frontmatter::default();
        fm.fields.insert("project".into(), yaml("owner:\n  name: ada\nstatus: open"));

        assert_eq!(fm.get_path("project.owner.name"), &FieldValue::String("ada".into()));
        assert_eq!(fm.get_path("project.status"), &FieldValue::String("open".into()));
        assert!(fm.get_path("project.missing.deeper").is_missing());
        assert!(fm.get_path("project.status.deeper").is_missing());
        assert!(fm.get_path("nothing").is_missing());
    }

    #[test]
    fn truthiness() {
        assert!(!FieldValue::Missing.is_truthy());
        assert!(!FieldValue::Number(0.0).is_truthy());
        assert!(!FieldValue::String(String::new()).is_truthy());
        assert!(!FieldValue::List(vec![]).is_truthy());
        assert!(FieldValue::Boolean(true).is_truthy());
        assert!(FieldValue::String("x".into()).is_truthy());
    }

    #[test]
    fn non_string_keys_are_stringified() {
        let value = yaml("1: one\ntrue: yes");
        let FieldValue::Mapping(map) = value else { panic!("expected mapping") };
        assert!(map.contains_key("1"));
        assert!(map.contains_key("true"));
    }
}
