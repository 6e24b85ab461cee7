mod common;

use futures::future::join_all;

use common::create_test_store;
use govgraph_core::config::{IdentityConfig, StoreConfig};
use govgraph_core::store::{GraphStore, PropertyGraphStore};

#[tokio::test]
async fn test_resolve_is_idempotent() {
    let store = create_test_store().await;

    let first = store.resolve("https://oparl.example.org/body/1").await.unwrap();
    let second = store.resolve("https://oparl.example.org/body/1").await.unwrap();
    assert_eq!(first, second);

    let stats = store.get_stats().await.unwrap();
    assert_eq!(stats.sources, 1);
    assert_eq!(stats.resources, 1);
}

#[tokio::test]
async fn test_distinct_iris_get_distinct_ids() {
    let store = create_test_store().await;

    let a = store.resolve("https://oparl.example.org/person/1").await.unwrap();
    let b = store.resolve("https://oparl.example.org/person/2").await.unwrap();
    assert_ne!(a.id, b.id);
    // minted from one monotonic sequence
    assert!(b.id > a.id);

    let stats = store.get_stats().await.unwrap();
    assert_eq!(stats.sources, 2);
    assert_eq!(stats.resources, 2);
}

#[tokio::test]
async fn test_external_form_uses_id_namespace() {
    let identity = IdentityConfig {
        id_namespace: "https://id.example.org/r/".to_string(),
        ..IdentityConfig::default()
    };
    let store = GraphStore::with_settings(&StoreConfig::memory(), &identity)
        .await
        .unwrap();
    store.initialize().await.unwrap();

    let canonical = store.resolve("urn:example:1").await.unwrap();
    assert_eq!(
        canonical.external,
        format!("https://id.example.org/r/{}", canonical.id)
    );
    assert_eq!(store.ids().parse(&canonical.external), Some(canonical.id));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_resolve_mints_once() {
    let identity = IdentityConfig {
        max_mint_attempts: 64,
        ..IdentityConfig::default()
    };
    let store = GraphStore::with_settings(&StoreConfig::memory(), &identity)
        .await
        .unwrap();
    store.initialize().await.unwrap();

    let iri = "https://oparl.example.org/meeting/42";
    let handles = (0..8).map(|_| {
        let store = store.clone();
        tokio::spawn(async move { store.resolve(iri).await })
    });

    let ids: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap().id)
        .collect();

    assert!(ids.iter().all(|id| *id == ids[0]), "{:?}", ids);

    let stats = store.get_stats().await.unwrap();
    assert_eq!(stats.sources, 1);
    assert_eq!(stats.resources, 1);
}

#[tokio::test]
async fn test_resolve_many_iris_concurrently_on_one_task() {
    let store = create_test_store().await;

    let iris: Vec<String> = (0..5)
        .map(|i| format!("https://oparl.example.org/paper/{}", i % 3))
        .collect();
    let results = join_all(iris.iter().map(|iri| store.resolve(iri))).await;

    let ids: Vec<_> = results.into_iter().map(|r| r.unwrap().id).collect();
    assert_eq!(ids[0], ids[3]);
    assert_eq!(ids[1], ids[4]);
    assert_ne!(ids[0], ids[1]);
    assert_ne!(ids[1], ids[2]);

    let stats = store.get_stats().await.unwrap();
    assert_eq!(stats.sources, 3);
}
