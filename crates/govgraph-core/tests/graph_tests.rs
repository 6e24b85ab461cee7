mod common;

use std::collections::BTreeSet;

use common::*;
use govgraph_core::model::{Node, Relation, ResourceId, Value};
use govgraph_core::store::{PropertyGraphStore, StoreError};

fn ids(items: &[ResourceId]) -> BTreeSet<ResourceId> {
    items.iter().copied().collect()
}

#[tokio::test]
async fn test_two_cycle_terminates() {
    let store = create_test_store().await;
    let a = store.resolve("urn:a").await.unwrap().id;
    let b = store.resolve("urn:b").await.unwrap().id;

    for (iri, target) in [("urn:a", b), ("urn:b", a)] {
        let node = Node::builder(&record())
            .source(iri)
            .set("link", Relation::ByReference(target))
            .build()
            .unwrap();
        store.save(&node).await.unwrap();
    }

    let graph = store.load_graph(a).await.unwrap();
    assert_eq!(graph.ids(), ids(&[a, b]));
    assert_eq!(graph.root.id, a);
    assert_eq!(graph.subgraph.len(), 1);
    assert!(graph.subgraph.contains_key(&b));
    assert!(graph.is_complete());

    // same closure from the other side
    let graph = store.load_graph(b).await.unwrap();
    assert_eq!(graph.ids(), ids(&[a, b]));
}

#[tokio::test]
async fn test_self_reference_resolves_to_root() {
    let store = create_test_store().await;
    let a = store.resolve("urn:self").await.unwrap().id;

    let node = Node::builder(&record())
        .source("urn:self")
        .set("link", Relation::ByReference(a))
        .build()
        .unwrap();
    store.save(&node).await.unwrap();

    let graph = store.load_graph(a).await.unwrap();
    assert_eq!(graph.ids(), ids(&[a]));
    assert!(graph.subgraph.is_empty());
    assert_eq!(graph.root.value(&predicate("link")), Some(&Value::Resource(a)));
}

#[tokio::test]
async fn test_diamond_loads_shared_child_once() {
    let store = create_test_store().await;
    let top = store.resolve("urn:top").await.unwrap().id;
    let left = store.resolve("urn:left").await.unwrap().id;
    let right = store.resolve("urn:right").await.unwrap().id;
    let bottom = store.resolve("urn:bottom").await.unwrap().id;

    let top_node = Node::builder(&record())
        .source("urn:top")
        .set("link", Relation::ByReference(left))
        .set_many("numbers", [1])
        .build()
        .unwrap();
    let mut left_node = Node::builder(&record())
        .source("urn:left")
        .set("link", Relation::ByReference(bottom))
        .build()
        .unwrap();
    left_node.set("name", "left").unwrap();
    let right_node = Node::builder(&record())
        .source("urn:right")
        .set("link", Relation::ByReference(bottom))
        .build()
        .unwrap();
    let bottom_node = Node::builder(&record())
        .source("urn:bottom")
        .set("name", "bottom")
        .build()
        .unwrap();
    for result in store
        .save_many(&[top_node, left_node, right_node, bottom_node])
        .await
    {
        result.unwrap();
    }

    // top only reaches right through a second save
    let top_again = Node::builder(&meeting())
        .source("urn:top")
        .set_many(
            "organization",
            [Relation::ByReference(left), Relation::ByReference(right)],
        )
        .build()
        .unwrap();
    store.save(&top_again).await.unwrap();

    let graph = store.load_graph(top).await.unwrap();
    assert_eq!(graph.ids(), ids(&[top, left, right, bottom]));
    assert_eq!(graph.subgraph.len(), 3);
    assert_eq!(
        graph.get(bottom).unwrap().value(&predicate("name")).and_then(Value::as_str),
        Some("bottom")
    );
}

#[tokio::test]
async fn test_agenda_graph() {
    let store = create_test_store().await;

    let meeting_iri = "https://oparl.example.org/meeting/281";
    let organization_iri = "https://oparl.example.org/organization/12";
    let item_iris = [
        "https://oparl.example.org/agendaitem/1",
        "https://oparl.example.org/agendaitem/2",
        "https://oparl.example.org/agendaitem/3",
    ];

    let meeting_id = store.resolve(meeting_iri).await.unwrap().id;
    let organization_id = store.resolve(organization_iri).await.unwrap().id;
    let mut item_ids = Vec::new();
    for iri in item_iris {
        item_ids.push(store.resolve(iri).await.unwrap().id);
    }

    let mut meeting_node = Node::builder(&meeting())
        .source(meeting_iri)
        .set("name", "3. Sitzung des Finanzausschusses")
        .set("start", "24.05.2023 18:30")
        .set("organization", Relation::ByReference(organization_id))
        .build()
        .unwrap();
    for id in &item_ids {
        meeting_node.push("agenda", Relation::ByReference(*id)).unwrap();
    }

    let organization_node = Node::builder(&organization())
        .source(organization_iri)
        .set("name", "Finanzausschuss")
        .set("meeting", Relation::ByReference(meeting_id))
        .build()
        .unwrap();

    let mut nodes = vec![meeting_node, organization_node];
    for (position, iri) in item_iris.iter().enumerate() {
        nodes.push(
            Node::builder(&agenda_item())
                .source(*iri)
                .set("name", format!("TOP {}", position + 1))
                .set("number", format!("{}", position + 1))
                .set("public", position != 2)
                .set("meeting", Relation::ByReference(meeting_id))
                .build()
                .unwrap(),
        );
    }
    for result in store.save_many(&nodes).await {
        result.unwrap();
    }

    let graph = store.load_graph(meeting_id).await.unwrap();

    let mut expected = vec![meeting_id, organization_id];
    expected.extend(&item_ids);
    assert_eq!(graph.ids(), ids(&expected));
    assert!(graph.is_complete());

    // agenda items come back in saved order
    let agenda: Vec<_> = graph
        .root
        .values(&oparl("agendaItem"))
        .filter_map(Value::as_resource)
        .collect();
    assert_eq!(agenda, item_ids);

    let start = graph.root.value(&oparl("start")).unwrap();
    assert_eq!(start, &Value::Datetime(1684953000));

    let third = graph.get(item_ids[2]).unwrap();
    assert_eq!(third.value(&oparl("public")), Some(&Value::Boolean(false)));
    assert_eq!(third.value(&rdf_type()), Some(&Value::Url(oparl("AgendaItem"))));
}

#[tokio::test]
async fn test_inline_agenda_items_are_stored_as_resources() {
    let store = create_test_store().await;

    let item = |iri: &str, name: &str| {
        Node::builder(&agenda_item())
            .source(iri)
            .set("name", name)
            .build()
            .unwrap()
    };
    let item_a = "https://oparl.example.org/agendaitem/10";
    let item_b = "https://oparl.example.org/agendaitem/11";

    let meeting_node = Node::builder(&meeting())
        .source("https://oparl.example.org/meeting/300")
        .set("name", "Ratssitzung")
        .set_many(
            "agenda",
            [
                Relation::Inline(Box::new(item(item_a, "TOP 1"))),
                Relation::Inline(Box::new(item(item_b, "TOP 2"))),
            ],
        )
        .build()
        .unwrap();

    let meeting_id = store.save(&meeting_node).await.unwrap().id().unwrap();
    let id_a = store.resolve(item_a).await.unwrap().id;
    let id_b = store.resolve(item_b).await.unwrap().id;

    let graph = store.load_graph(meeting_id).await.unwrap();
    let agenda: Vec<_> = graph
        .root
        .values(&oparl("agendaItem"))
        .filter_map(Value::as_resource)
        .collect();
    assert_eq!(agenda, vec![id_a, id_b]);
    assert_eq!(graph.ids(), ids(&[meeting_id, id_a, id_b]));
    assert!(graph.is_complete());

    let second = graph.get(id_b).unwrap();
    assert_eq!(second.value(&predicate("name")).and_then(Value::as_str), Some("TOP 2"));
    assert_eq!(second.value(&rdf_type()), Some(&Value::Url(oparl("AgendaItem"))));

    let stats = store.get_stats().await.unwrap();
    assert_eq!(stats.sources, 3);
}

#[tokio::test]
async fn test_dangling_reference_is_reported() {
    let store = create_test_store().await;
    let missing = ResourceId::new(9_999);

    let node = Node::builder(&record())
        .source("urn:dangling")
        .set("link", Relation::ByReference(missing))
        .build()
        .unwrap();
    let root = store.save(&node).await.unwrap().id().unwrap();

    let graph = store.load_graph(root).await.unwrap();
    assert_eq!(graph.ids(), ids(&[root]));
    assert!(graph.dangling.contains(&missing));
    assert!(graph.failures.is_empty());
    assert!(!graph.is_complete());
}

#[tokio::test]
async fn test_unknown_root_is_not_found() {
    let store = create_test_store().await;

    let err = store.load_graph(ResourceId::new(31)).await.unwrap_err();
    assert!(matches!(err, StoreError::ResourceNotFound(id) if id == ResourceId::new(31)));
}

#[tokio::test]
async fn test_resource_without_properties_loads_empty() {
    let store = create_test_store().await;
    let id = store.resolve("urn:bare").await.unwrap().id;

    let graph = store.load_graph(id).await.unwrap();
    assert!(graph.root.properties.is_empty());
    assert!(graph.subgraph.is_empty());
}
