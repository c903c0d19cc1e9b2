use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::ParseError;

/// A typed filter or patch value.
///
/// Raw query values arrive as strings; they are coerced into one of these
/// variants at parse time so that store builders never have to guess.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A UTF-8 string.
    String(String),
    /// A 64-bit signed integer.
    Integer(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A boolean.
    Boolean(bool),
    /// A record identifier. Stores render it natively (an `ObjectId` for the
    /// document store, a `BIGINT` for numeric relational keys).
    Identifier(String),
    /// A point in time.
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Human-readable name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::Identifier(_) => "identifier",
            Self::Timestamp(_) => "timestamp",
        }
    }

    /// Convert into a JSON value.
    ///
    /// Identifiers become strings and timestamps become RFC 3339 strings in
    /// the same shape `chrono` serializes entity timestamps.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::String(s) | Self::Identifier(s) => serde_json::Value::String(s.clone()),
            Self::Integer(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Boolean(b) => serde_json::Value::Bool(*b),
            Self::Timestamp(ts) => serde_json::Value::String(rfc3339(ts)),
        }
    }
}

fn rfc3339(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) | Self::Identifier(s) => write!(f, "{s}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Timestamp(ts) => f.write_str(&rfc3339(ts)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Self::Timestamp(ts)
    }
}

/// The declared kind of an entity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
    Identifier,
    Timestamp,
}

impl FieldKind {
    fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Identifier => "identifier",
            Self::Timestamp => "RFC 3339 timestamp",
        }
    }
}

/// Per-entity field kinds used to coerce raw filter values.
///
/// Fields named by an identifier alias (`id` and `_id` by default) always
/// coerce to [`Value::Identifier`]. Declared fields parse strictly into their
/// kind. Anything else is inferred: `true`/`false`, then integers, then
/// finite floats, falling back to a string.
#[derive(Debug, Clone)]
pub struct FieldTypes {
    kinds: HashMap<String, FieldKind>,
    identifier_aliases: Vec<String>,
}

impl Default for FieldTypes {
    fn default() -> Self {
        Self {
            kinds: HashMap::new(),
            identifier_aliases: vec!["id".to_owned(), "_id".to_owned()],
        }
    }
}

impl FieldTypes {
    /// Create an empty set with the default identifier aliases.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the kind of a field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.kinds.insert(name.into(), kind);
        self
    }

    /// Treat an additional field name as an identifier.
    #[must_use]
    pub fn with_identifier_alias(mut self, name: impl Into<String>) -> Self {
        self.identifier_aliases.push(name.into());
        self
    }

    /// The effective kind of a field, if it is an alias or was declared.
    pub fn kind_of(&self, field: &str) -> Option<FieldKind> {
        if self.identifier_aliases.iter().any(|a| a == field) {
            return Some(FieldKind::Identifier);
        }
        self.kinds.get(field).copied()
    }

    /// Declared fields of the given kind, sorted by name.
    pub fn fields_of_kind(&self, kind: FieldKind) -> Vec<&str> {
        let mut fields: Vec<&str> = self
            .kinds
            .iter()
            .filter(|(_, k)| **k == kind)
            .map(|(name, _)| name.as_str())
            .collect();
        fields.sort_unstable();
        fields
    }

    /// Coerce a raw value for `field`.
    pub fn coerce(&self, field: &str, raw: &str) -> Result<Value, ParseError> {
        match self.kind_of(field) {
            Some(kind) => coerce_strict(field, raw, kind),
            None => Ok(infer(raw)),
        }
    }
}

fn coerce_strict(field: &str, raw: &str, kind: FieldKind) -> Result<Value, ParseError> {
    let invalid = || ParseError::InvalidValue {
        field: field.to_owned(),
        value: raw.to_owned(),
        expected: kind.name(),
    };

    match kind {
        FieldKind::String => Ok(Value::String(raw.to_owned())),
        FieldKind::Integer => raw.parse().map(Value::Integer).map_err(|_| invalid()),
        FieldKind::Float => raw
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::Float)
            .ok_or_else(invalid),
        FieldKind::Boolean => match raw {
            "true" => Ok(Value::Boolean(true)),
            "false" => Ok(Value::Boolean(false)),
            _ => Err(invalid()),
        },
        FieldKind::Identifier => {
            if !raw.is_empty()
                && raw
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                Ok(Value::Identifier(raw.to_owned()))
            } else {
                Err(invalid())
            }
        }
        FieldKind::Timestamp => DateTime::parse_from_rfc3339(raw)
            .map(|ts| Value::Timestamp(ts.with_timezone(&Utc)))
            .map_err(|_| invalid()),
    }
}

fn infer(raw: &str) -> Value {
    match raw {
        "true" => return Value::Boolean(true),
        "false" => return Value::Boolean(false),
        _ => {}
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Some(f) = raw.parse::<f64>().ok().filter(|f| f.is_finite()) {
        return Value::Float(f);
    }
    Value::String(raw.to_owned())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn infers_undeclared_values() {
        let types = FieldTypes::new();
        assert_eq!(types.coerce("age", "30").unwrap(), Value::Integer(30));
        assert_eq!(types.coerce("ratio", "0.5").unwrap(), Value::Float(0.5));
        assert_eq!(types.coerce("draft", "true").unwrap(), Value::Boolean(true));
        assert_eq!(
            types.coerce("title", "hello").unwrap(),
            Value::String("hello".into())
        );
    }

    #[test]
    fn non_finite_floats_stay_strings() {
        let types = FieldTypes::new();
        assert_eq!(
            types.coerce("x", "NaN").unwrap(),
            Value::String("NaN".into())
        );
        assert_eq!(
            types.coerce("x", "inf").unwrap(),
            Value::String("inf".into())
        );
    }

    #[test]
    fn identifier_aliases_win_over_inference() {
        let types = FieldTypes::new();
        assert_eq!(
            types.coerce("id", "42").unwrap(),
            Value::Identifier("42".into())
        );
        assert_eq!(
            types.coerce("_id", "65f1c0ffee0000000000beef").unwrap(),
            Value::Identifier("65f1c0ffee0000000000beef".into())
        );
    }

    #[test]
    fn identifier_rejects_punctuation() {
        let types = FieldTypes::new();
        let err = types.coerce("id", "{\"$ne\":1}").unwrap_err();
        assert!(matches!(err, ParseError::InvalidValue { .. }));
        assert!(types.coerce("id", "").is_err());
    }

    #[test]
    fn declared_string_keeps_numeric_text() {
        let types = FieldTypes::new().with_field("title", FieldKind::String);
        assert_eq!(
            types.coerce("title", "2024").unwrap(),
            Value::String("2024".into())
        );
    }

    #[test]
    fn declared_integer_is_strict() {
        let types = FieldTypes::new().with_field("author_id", FieldKind::Integer);
        assert_eq!(types.coerce("author_id", "7").unwrap(), Value::Integer(7));
        let err = types.coerce("author_id", "seven").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value 'seven' for field 'author_id': expected integer"
        );
    }

    #[test]
    fn declared_timestamp_parses_rfc3339() {
        let types = FieldTypes::new().with_field("created_at", FieldKind::Timestamp);
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(
            types.coerce("created_at", "2024-03-01T14:00:00+02:00").unwrap(),
            Value::Timestamp(expected)
        );
        assert!(types.coerce("created_at", "yesterday").is_err());
    }

    #[test]
    fn declared_boolean_rejects_other_text() {
        let types = FieldTypes::new().with_field("published", FieldKind::Boolean);
        assert!(types.coerce("published", "yes").is_err());
    }

    #[test]
    fn extra_identifier_alias() {
        let types = FieldTypes::new().with_identifier_alias("post_id");
        assert_eq!(types.kind_of("post_id"), Some(FieldKind::Identifier));
    }

    #[test]
    fn to_json_renders_timestamps_as_strings() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            Value::Timestamp(ts).to_json(),
            serde_json::json!("2024-01-02T03:04:05Z")
        );
        assert_eq!(Value::Integer(3).to_json(), serde_json::json!(3));
    }
}
