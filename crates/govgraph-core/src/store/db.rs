//! SurrealDB embedded database for the property graph.

use serde::Deserialize;
use surrealdb::engine::local::{Db, Mem, RocksDb};
use surrealdb::Surreal;

use super::error::StoreError;
use super::property::PropertyRow;
use crate::config::StoreConfig;
use crate::model::ResourceId;

/// Schema version recorded in the metadata table.
const SCHEMA_VERSION: &str = "1";

/// Database connection for the property graph.
///
/// Cloning is cheap and every clone shares the same connection.
#[derive(Clone)]
pub struct GraphDb {
    db: Surreal<Db>,
}

impl GraphDb {
    /// Open the database described by `config`.
    pub async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let db = if config.is_memory() {
            Surreal::new::<Mem>(()).await?
        } else {
            let path = config.db_path();
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        StoreError::Database(format!("{}: {}", parent.display(), e))
                    })?;
                }
            }
            Surreal::new::<RocksDb>(path.as_path()).await?
        };
        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await?;

        Ok(Self { db })
    }

    /// Open a fresh in-memory database.
    pub async fn memory() -> Result<Self, StoreError> {
        Self::open(&StoreConfig::memory()).await
    }

    /// Create tables, fields and indexes. Safe to run repeatedly.
    pub async fn initialize_schema(&self) -> Result<(), StoreError> {
        // ===========================================================================
        // IDENTITY TABLES
        // ===========================================================================

        // External IRI -> canonical id. The unique index is what makes minting race-safe.
        self.db
            .query(
                r#"
                DEFINE TABLE IF NOT EXISTS source SCHEMAFULL;
                DEFINE FIELD IF NOT EXISTS iri ON source TYPE string;
                DEFINE FIELD IF NOT EXISTS resource_id ON source TYPE int;
                DEFINE INDEX IF NOT EXISTS source_iri ON source FIELDS iri UNIQUE;
                "#,
            )
            .await?
            .check()?;

        // Canonical resources
        self.db
            .query(
                r#"
                DEFINE TABLE IF NOT EXISTS resource SCHEMAFULL;
                DEFINE FIELD IF NOT EXISTS rid ON resource TYPE int;
                DEFINE FIELD IF NOT EXISTS created_at ON resource TYPE datetime;
                DEFINE FIELD IF NOT EXISTS updated_at ON resource TYPE option<datetime>;
                DEFINE INDEX IF NOT EXISTS resource_rid ON resource FIELDS rid UNIQUE;
                "#,
            )
            .await?
            .check()?;

        // Shared monotonic sequence for minting
        self.db
            .query(
                r#"
                DEFINE TABLE IF NOT EXISTS counter SCHEMAFULL;
                DEFINE FIELD IF NOT EXISTS current ON counter TYPE int DEFAULT 0;
                "#,
            )
            .await?
            .check()?;

        // ===========================================================================
        // PROPERTY TABLE - one typed value per row, exactly one slot populated
        // ===========================================================================

        self.db
            .query(
                r#"
                DEFINE TABLE IF NOT EXISTS property SCHEMAFULL;
                DEFINE FIELD IF NOT EXISTS resource_id ON property TYPE int;
                DEFINE FIELD IF NOT EXISTS predicate ON property TYPE string;
                DEFINE FIELD IF NOT EXISTS position ON property TYPE option<int>;
                DEFINE FIELD IF NOT EXISTS value_resource ON property TYPE option<int>;
                DEFINE FIELD IF NOT EXISTS value_boolean ON property TYPE option<bool>;
                DEFINE FIELD IF NOT EXISTS value_integer ON property TYPE option<int>;
                DEFINE FIELD IF NOT EXISTS value_float ON property TYPE option<float>;
                DEFINE FIELD IF NOT EXISTS value_datetime ON property TYPE option<int>;
                DEFINE FIELD IF NOT EXISTS value_string ON property TYPE option<string>;
                DEFINE FIELD IF NOT EXISTS value_url ON property TYPE option<string>;
                DEFINE FIELD IF NOT EXISTS value_json ON property TYPE option<string>;
                DEFINE FIELD IF NOT EXISTS populated ON property TYPE int DEFAULT 0
                    VALUE (IF value_resource != NONE THEN 1 ELSE 0 END)
                        + (IF value_boolean != NONE THEN 1 ELSE 0 END)
                        + (IF value_integer != NONE THEN 1 ELSE 0 END)
                        + (IF value_float != NONE THEN 1 ELSE 0 END)
                        + (IF value_datetime != NONE THEN 1 ELSE 0 END)
                        + (IF value_string != NONE THEN 1 ELSE 0 END)
                        + (IF value_url != NONE THEN 1 ELSE 0 END)
                        + (IF value_json != NONE THEN 1 ELSE 0 END)
                    ASSERT $value = 1;
                DEFINE INDEX IF NOT EXISTS property_owner ON property FIELDS resource_id, predicate;
                "#,
            )
            .await?
            .check()?;

        // ===========================================================================
        // METADATA
        // ===========================================================================

        self.db
            .query(
                r#"
                DEFINE TABLE IF NOT EXISTS metadata SCHEMALESS;
                UPSERT metadata:schema SET version = $version, updated_at = time::now();
                "#,
            )
            .bind(("version", SCHEMA_VERSION))
            .await?
            .check()?;

        Ok(())
    }

    /// Check if the database has been initialized.
    pub async fn is_initialized(&self) -> Result<bool, StoreError> {
        #[derive(Deserialize)]
        struct VersionRow {
            #[allow(dead_code)]
            version: String,
        }

        let rows: Vec<VersionRow> = self
            .db
            .query("SELECT version FROM metadata:schema")
            .await?
            .take(0)?;

        Ok(!rows.is_empty())
    }

    // ===========================================================================
    // IDENTITY
    // ===========================================================================

    /// Canonical ids of every source row carrying `iri`.
    pub async fn find_sources(&self, iri: &str) -> Result<Vec<i64>, StoreError> {
        #[derive(Deserialize)]
        struct SourceRow {
            resource_id: i64,
        }

        let rows: Vec<SourceRow> = self
            .db
            .query("SELECT resource_id FROM source WHERE iri = $iri")
            .bind(("iri", iri.to_string()))
            .await?
            .take(0)?;

        Ok(rows.into_iter().map(|r| r.resource_id).collect())
    }

    /// Draw the next value of the shared sequence.
    ///
    /// Values are never handed back, so a lost race leaves a gap.
    pub async fn next_resource_id(&self) -> Result<ResourceId, StoreError> {
        #[derive(Deserialize)]
        struct CounterRow {
            current: i64,
        }

        let rows: Vec<CounterRow> = self
            .db
            .query("UPSERT counter:resource SET current += 1 RETURN current")
            .await?
            .take(0)?;

        rows.first()
            .map(|r| ResourceId::new(r.current))
            .ok_or_else(|| StoreError::Database("resource counter returned no value".to_string()))
    }

    /// Insert the Resource and Source rows for a freshly minted id in one
    /// transaction. Fails when another caller committed the same IRI first.
    pub async fn insert_source(&self, iri: &str, id: ResourceId) -> Result<(), StoreError> {
        self.db
            .query(
                r#"
                BEGIN TRANSACTION;
                CREATE resource SET rid = $id, created_at = time::now();
                CREATE source SET iri = $iri, resource_id = $id;
                COMMIT TRANSACTION;
                "#,
            )
            .bind(("id", id.get()))
            .bind(("iri", iri.to_string()))
            .await?
            .check()?;

        Ok(())
    }

    /// Whether a Resource row exists for `id`.
    pub async fn resource_exists(&self, id: ResourceId) -> Result<bool, StoreError> {
        #[derive(Deserialize)]
        struct ResourceRow {
            #[allow(dead_code)]
            rid: i64,
        }

        let rows: Vec<ResourceRow> = self
            .db
            .query("SELECT rid FROM resource WHERE rid = $id LIMIT 1")
            .bind(("id", id.get()))
            .await?
            .take(0)?;

        Ok(!rows.is_empty())
    }

    // ===========================================================================
    // PROPERTIES
    // ===========================================================================

    /// Replace every row of `predicates` on `resource` with `rows`, atomically.
    ///
    /// The owning resource record is written first, so two replaces of one
    /// resource conflict and one of them fails instead of both committing.
    pub(crate) async fn replace_properties(
        &self,
        resource: ResourceId,
        predicates: Vec<String>,
        rows: Vec<PropertyRow>,
    ) -> Result<(), StoreError> {
        self.db
            .query(
                r#"
                BEGIN TRANSACTION;
                UPDATE resource SET updated_at = time::now() WHERE rid = $resource;
                DELETE property WHERE resource_id = $resource AND predicate IN $predicates;
                INSERT INTO property $rows;
                COMMIT TRANSACTION;
                "#,
            )
            .bind(("resource", resource.get()))
            .bind(("predicates", predicates))
            .bind(("rows", rows))
            .await?
            .check()?;

        Ok(())
    }

    /// All property rows of `resource`, ordered by predicate then position.
    pub(crate) async fn properties_of(
        &self,
        resource: ResourceId,
    ) -> Result<Vec<PropertyRow>, StoreError> {
        let rows: Vec<PropertyRow> = self
            .db
            .query(
                r#"
                SELECT resource_id, predicate, position,
                    value_resource, value_boolean, value_integer, value_float,
                    value_datetime, value_string, value_url, value_json
                FROM property
                WHERE resource_id = $resource
                ORDER BY predicate, position
                "#,
            )
            .bind(("resource", resource.get()))
            .await?
            .take(0)?;

        Ok(rows)
    }

    /// Row counts of the identity and property tables.
    pub async fn get_stats(&self) -> Result<StoreStats, StoreError> {
        // SurrealDB returns count as { count: N }
        #[derive(Deserialize)]
        struct CountResult {
            count: i64,
        }

        async fn count_table(db: &Surreal<Db>, table: &str) -> Result<usize, StoreError> {
            let result: Option<CountResult> = db
                .query(format!("SELECT count() FROM {} GROUP ALL", table))
                .await?
                .take(0)?;
            Ok(result.map(|r| r.count as usize).unwrap_or(0))
        }

        Ok(StoreStats {
            sources: count_table(&self.db, "source").await?,
            resources: count_table(&self.db, "resource").await?,
            properties: count_table(&self.db, "property").await?,
        })
    }
}

/// Row counts reported by [`GraphDb::get_stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub sources: usize,
    pub resources: usize,
    pub properties: usize,
}
