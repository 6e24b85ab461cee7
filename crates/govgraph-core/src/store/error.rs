//! Property graph store error types.

use thiserror::Error;

use crate::config::ConfigError;
use crate::model::{ModelError, ResourceId, ValueKind};

/// Errors that can occur in the property graph store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// More than one Source row for one IRI. Never healed automatically.
    #[error("Data integrity fault: {count} source rows for IRI {iri}")]
    DuplicateSource { iri: String, count: usize },

    /// Concurrent minters kept winning for this IRI.
    #[error("Could not mint an id for {iri} after {attempts} attempts")]
    MintRace { iri: String, attempts: u32 },

    /// Concurrent saves of the same resource kept conflicting.
    #[error("Could not write properties of resource {resource} after {attempts} attempts: {reason}")]
    WriteConflict {
        resource: ResourceId,
        attempts: u32,
        reason: String,
    },

    /// The resolver returned an id without a Resource row.
    #[error("Resource {0} has a source but no resource row")]
    MissingResource(ResourceId),

    /// A non-individual node without a source IRI.
    #[error("{type_name} node has no source IRI")]
    MissingSource { type_name: String },

    /// A value kind that no storage slot can hold.
    #[error("Value of kind {kind} for {predicate} cannot be stored")]
    UnmappableValue { predicate: String, kind: ValueKind },

    /// A stored row that does not populate exactly one value slot.
    #[error("Malformed property {predicate} on resource {resource}: {reason}")]
    MalformedProperty {
        resource: ResourceId,
        predicate: String,
        reason: String,
    },

    /// Load of a resource id that was never minted.
    #[error("Resource not found: {0}")]
    ResourceNotFound(ResourceId),

    /// Store not initialized.
    #[error("Property graph store not initialized. Run 'govgraph init' first.")]
    NotInitialized,

    /// Node building, validation or serialization error.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::MintRace { .. } | StoreError::WriteConflict { .. }
        )
    }
}

impl From<surrealdb::Error> for StoreError {
    fn from(err: surrealdb::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}
