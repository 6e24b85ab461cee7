//! Canonical resource identity and property graph storage.
//!
//! # Components
//!
//! - [`GraphStore`] - Main facade implementing [`PropertyGraphStore`]
//! - [`GraphDb`] - SurrealDB embedded database (RocksDB or in-memory)
//! - `identity` - race-safe IRI to canonical id resolution
//! - `property` - typed values to single-slot property rows and back
//! - `loader` - transitive subgraph reconstruction
//!
//! # Storage
//!
//! - **source**: external IRI -> canonical id, unique on `iri`
//! - **resource**: one row per minted id
//! - **property**: one typed value per row, exactly one value slot set
//!
//! # Example
//!
//! ```ignore
//! use govgraph_core::store::{GraphStore, PropertyGraphStore};
//!
//! let store = GraphStore::in_memory().await?;
//! store.initialize().await?;
//!
//! let outcome = store.save(&meeting).await?;
//! let graph = store.load_graph(outcome.id().unwrap()).await?;
//! ```

mod db;
mod error;
mod identity;
mod loader;
mod property;

pub use db::{GraphDb, StoreStats};
pub use error::StoreError;
pub use loader::{Graph, LoadedResource};
pub use property::{Property, SaveOutcome};

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{Config, IdentityConfig, StoreConfig};
use crate::model::{CanonicalId, IdTemplate, Node, ResourceId};
use identity::IdentityResolver;
use loader::Traversal;
use property::PropertyWriter;

/// Main interface for the property graph store.
#[async_trait]
pub trait PropertyGraphStore: Send + Sync {
    /// Create tables and indexes.
    async fn initialize(&self) -> Result<(), StoreError>;

    /// Check if the store has been initialized.
    async fn is_initialized(&self) -> Result<bool, StoreError>;

    /// Canonical id of an external IRI, minted on first sight.
    async fn resolve(&self, iri: &str) -> Result<CanonicalId, StoreError>;

    /// Save one node, replacing the rows of every predicate it carries.
    async fn save(&self, node: &Node) -> Result<SaveOutcome, StoreError>;

    /// Save nodes independently; one result per node, in input order.
    async fn save_many(&self, nodes: &[Node]) -> Vec<Result<SaveOutcome, StoreError>>;

    /// Load one resource without following references.
    async fn load_resource(&self, id: ResourceId) -> Result<LoadedResource, StoreError>;

    /// Load a resource and everything reachable from it.
    async fn load_graph(&self, id: ResourceId) -> Result<Graph, StoreError>;

    /// Row counts.
    async fn get_stats(&self) -> Result<StoreStats, StoreError>;
}

/// The property graph store.
///
/// Clones share one database connection.
#[derive(Clone)]
pub struct GraphStore {
    db: Arc<GraphDb>,
    ids: IdTemplate,
    max_mint_attempts: u32,
    max_write_attempts: u32,
}

impl GraphStore {
    /// Open the store described by the `[store]` and `[identity]` sections.
    pub async fn open(config: &Config) -> Result<Self, StoreError> {
        config.validate()?;
        Self::with_settings(&config.store, &config.identity).await
    }

    pub async fn with_settings(
        store: &StoreConfig,
        identity: &IdentityConfig,
    ) -> Result<Self, StoreError> {
        let db = GraphDb::open(store).await?;
        Ok(Self {
            db: Arc::new(db),
            ids: identity.id_template(),
            max_mint_attempts: identity.max_mint_attempts,
            max_write_attempts: store.max_write_attempts,
        })
    }

    /// A fresh in-memory store with default identity settings.
    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::with_settings(&StoreConfig::memory(), &IdentityConfig::default()).await
    }

    /// Formats and parses external ids for this store.
    pub fn ids(&self) -> &IdTemplate {
        &self.ids
    }

    fn resolver(&self) -> IdentityResolver<'_> {
        IdentityResolver::new(&self.db, &self.ids, self.max_mint_attempts)
    }

    fn writer(&self) -> PropertyWriter<'_> {
        PropertyWriter::new(&self.db, self.resolver(), self.max_write_attempts)
    }
}

#[async_trait]
impl PropertyGraphStore for GraphStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        self.db.initialize_schema().await
    }

    async fn is_initialized(&self) -> Result<bool, StoreError> {
        self.db.is_initialized().await
    }

    async fn resolve(&self, iri: &str) -> Result<CanonicalId, StoreError> {
        self.resolver().resolve(iri).await
    }

    async fn save(&self, node: &Node) -> Result<SaveOutcome, StoreError> {
        self.writer().save(node).await
    }

    async fn save_many(&self, nodes: &[Node]) -> Vec<Result<SaveOutcome, StoreError>> {
        let writer = self.writer();
        let mut results = Vec::with_capacity(nodes.len());
        for node in nodes {
            results.push(writer.save(node).await);
        }
        results
    }

    async fn load_resource(&self, id: ResourceId) -> Result<LoadedResource, StoreError> {
        loader::load_resource(&self.db, id).await
    }

    async fn load_graph(&self, id: ResourceId) -> Result<Graph, StoreError> {
        Traversal::new(&self.db).run(id).await
    }

    async fn get_stats(&self) -> Result<StoreStats, StoreError> {
        self.db.get_stats().await
    }
}
