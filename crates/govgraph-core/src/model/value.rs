//! Raw field input and serialized property values.

use chrono::{DateTime, Utc};
use std::fmt;

use super::id::ResourceId;
use super::node::{Node, NodeDocument};

/// A value as handed to a node by a producer, before serialization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Float(f64),
    Datetime(DateTime<Utc>),
    Json(serde_json::Value),
    Relation(Relation),
}

impl RawValue {
    /// Short name of the runtime kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Boolean(_) => "boolean",
            Self::Float(_) => "float",
            Self::Datetime(_) => "datetime",
            Self::Json(_) => "json",
            Self::Relation(_) => "relation",
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }
}

/// How a related node is serialized. The caller decides.
#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
    /// Embed the full representation of the node.
    Inline(Box<Node>),
    /// Refer to an already persisted resource by id.
    ByReference(ResourceId),
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for RawValue {
    fn from(v: i32) -> Self {
        Self::Integer(v.into())
    }
}

impl From<bool> for RawValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<DateTime<Utc>> for RawValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Datetime(v)
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl From<ResourceId> for RawValue {
    fn from(v: ResourceId) -> Self {
        Self::Relation(Relation::ByReference(v))
    }
}

impl From<Node> for RawValue {
    fn from(v: Node) -> Self {
        Self::Relation(Relation::Inline(Box::new(v)))
    }
}

impl From<Relation> for RawValue {
    fn from(v: Relation) -> Self {
        Self::Relation(v)
    }
}

/// What a node holds for one declared field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    One(RawValue),
    Many(Vec<RawValue>),
}

impl FieldValue {
    /// The held values in order.
    pub fn iter(&self) -> std::slice::Iter<'_, RawValue> {
        match self {
            Self::One(v) => std::slice::from_ref(v).iter(),
            Self::Many(vs) => vs.iter(),
        }
    }

    /// True when the field carries nothing worth emitting.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(v) => v.is_empty(),
            Self::Many(vs) => vs.iter().all(RawValue::is_empty),
        }
    }
}

/// Discriminant of a serialized [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Resource,
    Boolean,
    Integer,
    Float,
    Datetime,
    String,
    Url,
    Json,
    Inline,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Resource => "resource",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Datetime => "datetime",
            Self::String => "string",
            Self::Url => "url",
            Self::Json => "json",
            Self::Inline => "inline",
        };
        f.write_str(name)
    }
}

/// A serialized property value: kind plus payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Resource(ResourceId),
    Boolean(bool),
    Integer(i64),
    Float(f64),
    /// Seconds since the Unix epoch.
    Datetime(i64),
    String(String),
    Url(String),
    Json(serde_json::Value),
    /// An embedded node document. Renderable, but has no storage slot.
    Inline(Box<NodeDocument>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Resource(_) => ValueKind::Resource,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Integer(_) => ValueKind::Integer,
            Self::Float(_) => ValueKind::Float,
            Self::Datetime(_) => ValueKind::Datetime,
            Self::String(_) => ValueKind::String,
            Self::Url(_) => ValueKind::Url,
            Self::Json(_) => ValueKind::Json,
            Self::Inline(_) => ValueKind::Inline,
        }
    }

    pub fn as_resource(&self) -> Option<ResourceId> {
        match self {
            Self::Resource(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Url(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub(crate) fn is_blank(&self) -> bool {
        matches!(self, Self::String(s) if s.is_empty())
    }
}

impl fmt::Display for Value {
    /// The lexical form: epoch seconds for datetimes, bare ids for references.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource(id) => write!(f, "{}", id),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Datetime(ts) => write!(f, "{}", ts),
            Self::String(s) | Self::Url(s) => f.write_str(s),
            Self::Json(v) => write!(f, "{}", v),
            Self::Inline(doc) => write!(f, "[{}]", doc.type_name),
        }
    }
}
