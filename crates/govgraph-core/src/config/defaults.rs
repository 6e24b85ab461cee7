//! Default values for govgraph configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Store Defaults
// ============================================================================

/// Storage engine: "rocksdb" for an on-disk database, "memory" for tests.
pub const DEFAULT_ENGINE: &str = "rocksdb";

/// Engines accepted by `store.engine`.
pub const SUPPORTED_ENGINES: &[&str] = &["rocksdb", "memory"];

/// Database directory (rocksdb engine only).
pub const DEFAULT_DB_PATH: &str = ".govgraph/graph.db";

/// SurrealDB namespace.
pub const DEFAULT_DB_NAMESPACE: &str = "govgraph";

/// SurrealDB database.
pub const DEFAULT_DB_DATABASE: &str = "graph";

/// How many times a node's property transaction may be retried after a conflict.
pub const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 8;

// ============================================================================
// Identity Defaults
// ============================================================================

/// Namespace of external identifiers (`<id-namespace>/<integer>`).
pub const DEFAULT_ID_NAMESPACE: &str = "https://id.govgraph.org/resource";

/// How many lookup/mint rounds a resolve may take before giving up.
pub const DEFAULT_MAX_MINT_ATTEMPTS: u32 = 8;

// ============================================================================
// Logging Defaults
// ============================================================================

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

// ============================================================================
// File Locations
// ============================================================================

/// Project-local config file.
pub const LOCAL_CONFIG_FILE: &str = "govgraph.toml";

/// Directory under the user config dir.
pub const USER_CONFIG_DIR: &str = "govgraph";

/// File name under the user config dir.
pub const USER_CONFIG_FILE: &str = "config.toml";
