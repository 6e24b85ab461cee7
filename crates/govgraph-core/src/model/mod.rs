//! Typed node model: namespaces, field descriptors, node types and values.
//!
//! Everything here is pure. Producers build [`Node`]s, the store persists
//! the [`NodeDocument`] a node serializes to.

pub mod datetime;
mod error;
mod field;
mod id;
pub mod namespace;
mod node;
mod value;

pub use error::ModelError;
pub use field::{FieldDescriptor, FieldKind};
pub use id::{CanonicalId, IdTemplate, ResourceId};
pub use namespace::{ns, Namespace, Predicate};
pub use node::{Node, NodeBuilder, NodeDocument, NodeType, NodeTypeBuilder, Statement};
pub use value::{FieldValue, RawValue, Relation, Value, ValueKind};
