#![allow(dead_code)]

use std::sync::Arc;

use govgraph_core::model::{ns, FieldDescriptor, FieldKind, NodeType};
use govgraph_core::store::{GraphStore, PropertyGraphStore};

pub async fn create_test_store() -> GraphStore {
    let store = GraphStore::in_memory().await.unwrap();
    store.initialize().await.unwrap();
    store
}

pub fn predicate(local_name: &str) -> String {
    ns::SCHEMA.term(local_name).full_uri()
}

pub fn oparl(local_name: &str) -> String {
    ns::OPARL.term(local_name).full_uri()
}

pub fn rdf_type() -> String {
    ns::RDF.term("type").full_uri()
}

pub fn thing() -> Arc<NodeType> {
    NodeType::builder("Thing")
        .field(FieldDescriptor::new(&ns::SCHEMA, "name", FieldKind::String))
        .field(FieldDescriptor::new(&ns::SCHEMA, "url", FieldKind::Url))
        .build()
}

pub fn organization() -> Arc<NodeType> {
    NodeType::builder("Organization")
        .rdf_type(ns::OPARL.term("Organization"))
        .extends(&thing())
        .field(FieldDescriptor::new(&ns::SCHEMA, "name", FieldKind::String).required())
        .field(FieldDescriptor::new(&ns::OPARL, "meeting", FieldKind::Relation).many())
        .build()
}

pub fn meeting() -> Arc<NodeType> {
    NodeType::builder("Meeting")
        .rdf_type(ns::OPARL.term("Meeting"))
        .extends(&thing())
        .field(FieldDescriptor::new(&ns::OPARL, "start", FieldKind::Datetime))
        .field(FieldDescriptor::new(&ns::OPARL, "organization", FieldKind::Relation).many())
        .field(
            FieldDescriptor::new(&ns::OPARL, "agendaItem", FieldKind::Relation)
                .many()
                .named("agenda"),
        )
        .build()
}

pub fn agenda_item() -> Arc<NodeType> {
    NodeType::builder("AgendaItem")
        .rdf_type(ns::OPARL.term("AgendaItem"))
        .extends(&thing())
        .field(FieldDescriptor::new(&ns::OPARL, "number", FieldKind::String))
        .field(FieldDescriptor::new(&ns::OPARL, "public", FieldKind::Boolean))
        .field(FieldDescriptor::new(&ns::OPARL, "meeting", FieldKind::Relation))
        .build()
}

/// A self-identifying enumeration value, never stored.
pub fn legislative_term() -> Arc<NodeType> {
    NodeType::builder("LegislativeTerm")
        .individual()
        .field(FieldDescriptor::new(&ns::SCHEMA, "name", FieldKind::String))
        .build()
}

/// One field of every storable kind, no type URI.
pub fn record() -> Arc<NodeType> {
    NodeType::builder("Record")
        .field(FieldDescriptor::new(&ns::SCHEMA, "name", FieldKind::String))
        .field(FieldDescriptor::new(&ns::SCHEMA, "count", FieldKind::Integer))
        .field(FieldDescriptor::new(&ns::SCHEMA, "flag", FieldKind::Boolean))
        .field(FieldDescriptor::new(&ns::SCHEMA, "ratio", FieldKind::Float))
        .field(FieldDescriptor::new(&ns::SCHEMA, "when", FieldKind::Datetime))
        .field(FieldDescriptor::new(&ns::SCHEMA, "url", FieldKind::Url))
        .field(FieldDescriptor::new(&ns::SCHEMA, "extra", FieldKind::Json))
        .field(FieldDescriptor::new(&ns::SCHEMA, "link", FieldKind::Relation))
        .field(FieldDescriptor::new(&ns::SCHEMA, "numbers", FieldKind::Integer).many())
        .build()
}
