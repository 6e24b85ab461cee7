//! Typed field descriptors.
//!
//! A descriptor binds a field name on a node type to a predicate and a
//! storage kind, and owns the rule that turns a [`RawValue`] into a
//! serialized [`Value`].

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

use super::datetime;
use super::error::ModelError;
use super::namespace::{Namespace, Predicate};
use super::value::{RawValue, Relation, Value};

/// Storage kind declared for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    Integer,
    Boolean,
    Float,
    Datetime,
    Url,
    Json,
    Relation,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Float => "float",
            Self::Datetime => "datetime",
            Self::Url => "url",
            Self::Json => "json",
            Self::Relation => "relation",
        };
        f.write_str(name)
    }
}

/// Declaration of one field of a node type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    name: String,
    predicate: Predicate,
    kind: FieldKind,
    required: bool,
    many: bool,
}

impl FieldDescriptor {
    /// Declare a field; its name defaults to the local name.
    pub fn new(namespace: &Namespace, local_name: &str, kind: FieldKind) -> Self {
        Self {
            name: local_name.to_string(),
            predicate: namespace.term(local_name),
            kind,
            required: false,
            many: false,
        }
    }

    /// Mark the field as required for validation.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the field as multi-valued.
    pub fn many(mut self) -> Self {
        self.many = true;
        self
    }

    /// Use a field name other than the predicate's local name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_many(&self) -> bool {
        self.many
    }

    pub fn full_uri(&self) -> String {
        self.predicate.full_uri()
    }

    pub fn prefixed_uri(&self) -> String {
        self.predicate.prefixed_uri()
    }

    /// Serialize one raw value according to this field's kind.
    pub fn serialize(&self, value: &RawValue) -> Result<Value, ModelError> {
        match (self.kind, value) {
            (FieldKind::String, RawValue::Text(s)) => Ok(Value::String(normalize_text(s))),
            (FieldKind::Integer, RawValue::Integer(i)) => Ok(Value::Integer(*i)),
            (FieldKind::Boolean, RawValue::Boolean(b)) => Ok(Value::Boolean(*b)),
            (FieldKind::Float, RawValue::Float(x)) => Ok(Value::Float(*x)),
            (FieldKind::Datetime, RawValue::Datetime(dt)) => Ok(Value::Datetime(dt.timestamp())),
            (FieldKind::Datetime, RawValue::Integer(secs)) => Ok(Value::Datetime(*secs)),
            (FieldKind::Datetime, RawValue::Text(s)) => datetime::parse_epoch(s)
                .map(Value::Datetime)
                .ok_or_else(|| ModelError::UnparsableDate {
                    field: self.name.clone(),
                    input: s.clone(),
                }),
            (FieldKind::Url, RawValue::Text(s)) => {
                let url = s.trim();
                if url_pattern().is_match(url) {
                    Ok(Value::Url(url.to_string()))
                } else {
                    Err(ModelError::InvalidUrl {
                        field: self.name.clone(),
                        input: s.clone(),
                    })
                }
            }
            (FieldKind::Json, RawValue::Json(v)) => Ok(Value::Json(v.clone())),
            (FieldKind::Relation, RawValue::Relation(Relation::ByReference(id))) => {
                Ok(Value::Resource(*id))
            }
            (FieldKind::Relation, RawValue::Relation(Relation::Inline(node))) => {
                Ok(Value::Inline(Box::new(node.serialize()?)))
            }
            (kind, other) => Err(ModelError::TypeMismatch {
                field: self.name.clone(),
                expected: kind,
                found: other.kind_name(),
            }),
        }
    }
}

fn url_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:\S+$").expect("valid url pattern"))
}

/// NFKC-normalize and trim scraped text.
fn normalize_text(s: &str) -> String {
    s.nfkc().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::id::ResourceId;
    use crate::model::namespace::ns;
    use chrono::TimeZone;

    fn field(kind: FieldKind) -> FieldDescriptor {
        FieldDescriptor::new(&ns::SCHEMA, "thing", kind)
    }

    #[test]
    fn test_descriptor_uris() {
        let f = FieldDescriptor::new(&ns::OPARL, "agendaItem", FieldKind::Relation)
            .many()
            .named("agenda");
        assert_eq!(f.name(), "agenda");
        assert_eq!(f.full_uri(), "https://schema.oparl.org/1.1/agendaItem");
        assert_eq!(f.prefixed_uri(), "oparl:agendaItem");
        assert!(f.is_many());
        assert!(!f.is_required());
    }

    #[test]
    fn test_string_is_normalized_and_trimmed() {
        let f = field(FieldKind::String);
        // U+00A0 no-break space and the "ﬁ" ligature fold under NFKC
        let value = f.serialize(&"\u{00A0} Stadtrat ﬁnance \n".into()).unwrap();
        assert_eq!(value, Value::String("Stadtrat finance".to_string()));
    }

    #[test]
    fn test_scalar_type_checks() {
        assert_eq!(
            field(FieldKind::Integer).serialize(&42i64.into()).unwrap(),
            Value::Integer(42)
        );
        assert_eq!(
            field(FieldKind::Boolean).serialize(&true.into()).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            field(FieldKind::Float).serialize(&2.5.into()).unwrap(),
            Value::Float(2.5)
        );

        let err = field(FieldKind::Integer).serialize(&"42".into()).unwrap_err();
        assert!(matches!(
            err,
            ModelError::TypeMismatch { expected: FieldKind::Integer, found: "text", .. }
        ));
        assert!(field(FieldKind::Float).serialize(&1i64.into()).is_err());
        assert!(field(FieldKind::Boolean).serialize(&1i64.into()).is_err());
    }

    #[test]
    fn test_datetime_forms() {
        let f = field(FieldKind::Datetime);
        let expected = Value::Datetime(1620154800);
        let utc = chrono::Utc.with_ymd_and_hms(2021, 5, 4, 19, 0, 0).unwrap();

        assert_eq!(f.serialize(&utc.into()).unwrap(), expected);
        assert_eq!(f.serialize(&"2021-05-04T19:00:00Z".into()).unwrap(), expected);
        assert_eq!(f.serialize(&"04.05.2021 19:00".into()).unwrap(), expected);
        assert_eq!(f.serialize(&"1620154800".into()).unwrap(), expected);
        assert_eq!(f.serialize(&1620154800i64.into()).unwrap(), expected);
        assert_eq!(expected.to_string(), "1620154800");

        let err = f.serialize(&"sometime soon".into()).unwrap_err();
        assert!(matches!(err, ModelError::UnparsableDate { .. }));
        let err = f.serialize(&"99999999999999999999".into()).unwrap_err();
        assert!(matches!(err, ModelError::UnparsableDate { .. }));
        assert!(f.serialize(&true.into()).is_err());
    }

    #[test]
    fn test_url() {
        let f = field(FieldKind::Url);
        assert_eq!(
            f.serialize(&" https://example.org/file.pdf ".into()).unwrap(),
            Value::Url("https://example.org/file.pdf".to_string())
        );
        assert!(matches!(
            f.serialize(&"not a url".into()).unwrap_err(),
            ModelError::InvalidUrl { .. }
        ));
    }

    #[test]
    fn test_relation_by_reference() {
        let f = field(FieldKind::Relation);
        assert_eq!(
            f.serialize(&ResourceId::new(7).into()).unwrap(),
            Value::Resource(ResourceId::new(7))
        );
        assert!(f.serialize(&"7".into()).is_err());
    }

    #[test]
    fn test_json_passes_through() {
        let blob = serde_json::json!({"pages": 3, "tags": ["budget"]});
        assert_eq!(
            field(FieldKind::Json).serialize(&blob.clone().into()).unwrap(),
            Value::Json(blob)
        );
    }
}
