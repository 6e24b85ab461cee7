pub mod config;
pub mod model;
pub mod store;

pub use config::Config;
pub use model::{
    CanonicalId, FieldDescriptor, FieldKind, IdTemplate, ModelError, Node, NodeType, RawValue,
    Relation, ResourceId, Value,
};
pub use store::{Graph, GraphStore, PropertyGraphStore, SaveOutcome, StoreError};
