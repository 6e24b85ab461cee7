//! JSON rendering of loaded graphs.

use chrono::DateTime;
use serde_json::{json, Map, Value as Json};
use std::collections::BTreeMap;

use govgraph_core::model::{ns, IdTemplate, Value};
use govgraph_core::store::{Graph, LoadedResource};

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Render a graph as a JSON-LD style document: one `@graph` entry per
/// resource, predicates compacted against the well-known namespaces.
pub fn render_graph(graph: &Graph, ids: &IdTemplate) -> Json {
    let mut context = BTreeMap::new();
    let mut nodes = vec![render_resource(&graph.root, ids, &mut context)];
    for resource in graph.subgraph.values() {
        nodes.push(render_resource(resource, ids, &mut context));
    }

    let mut document = Map::new();
    document.insert("@context".to_string(), json!(context));
    document.insert("@graph".to_string(), Json::Array(nodes));
    if !graph.dangling.is_empty() {
        let dangling: Vec<String> = graph.dangling.iter().map(|id| ids.format(*id)).collect();
        document.insert("dangling".to_string(), json!(dangling));
    }
    Json::Object(document)
}

fn render_resource(
    resource: &LoadedResource,
    ids: &IdTemplate,
    context: &mut BTreeMap<String, String>,
) -> Json {
    let mut object = Map::new();
    object.insert("@id".to_string(), json!(ids.format(resource.id)));

    for predicate in resource.predicates() {
        let values: Vec<&Value> = resource.values(predicate).collect();
        let many = values.len() > 1
            || resource
                .properties
                .iter()
                .any(|p| p.predicate == predicate && p.order.is_some());

        if predicate == RDF_TYPE {
            let types: Vec<Json> = values
                .iter()
                .map(|v| json!(compact(&v.to_string(), context)))
                .collect();
            object.insert("@type".to_string(), collapse(types, false));
            continue;
        }

        let key = compact(predicate, context);
        let rendered = values.into_iter().map(|v| render_value(v, ids)).collect();
        object.insert(key, collapse(rendered, many));
    }

    Json::Object(object)
}

fn render_value(value: &Value, ids: &IdTemplate) -> Json {
    match value {
        Value::Resource(id) => json!({ "@id": ids.format(*id) }),
        Value::Boolean(b) => json!(b),
        Value::Integer(i) => json!(i),
        Value::Float(x) => json!(x),
        Value::Datetime(ts) => match DateTime::from_timestamp(*ts, 0) {
            Some(dt) => json!(dt.to_rfc3339()),
            None => json!(ts),
        },
        Value::String(s) => json!(s),
        Value::Url(u) => json!({ "@id": u }),
        Value::Json(v) => v.clone(),
        Value::Inline(doc) => json!(doc.type_name),
    }
}

/// Compact `uri` and record the prefix it used.
fn compact(uri: &str, context: &mut BTreeMap<String, String>) -> String {
    if let Some(namespace) = ns::lookup(uri) {
        context
            .entry(namespace.prefix().to_string())
            .or_insert_with(|| namespace.uri().to_string());
    }
    ns::compact(uri).unwrap_or_else(|| uri.to_string())
}

fn collapse(mut values: Vec<Json>, many: bool) -> Json {
    if values.len() == 1 && !many {
        values.remove(0)
    } else {
        Json::Array(values)
    }
}
