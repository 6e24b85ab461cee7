//! IRI to canonical id resolution.
//!
//! Minting is lookup, then draw from the shared counter, then insert the
//! Resource and Source rows in one transaction. The unique index on
//! `source.iri` makes concurrent minters collide on insert; the loser starts
//! over from the lookup and finds the winner's row.

use tracing::{debug, info, warn};

use super::db::GraphDb;
use super::error::StoreError;
use crate::model::{CanonicalId, IdTemplate, ResourceId};

/// Resolves external IRIs to canonical ids, minting on first sight.
#[derive(Clone, Copy)]
pub(crate) struct IdentityResolver<'a> {
    db: &'a GraphDb,
    ids: &'a IdTemplate,
    max_attempts: u32,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(db: &'a GraphDb, ids: &'a IdTemplate, max_attempts: u32) -> Self {
        Self {
            db,
            ids,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Return the canonical id of `iri`, minting one if it has none.
    ///
    /// Calling this any number of times, from any number of tasks, yields the
    /// same id for the same IRI.
    pub async fn resolve(&self, iri: &str) -> Result<CanonicalId, StoreError> {
        for attempt in 1..=self.max_attempts {
            if let Some(id) = single_source(iri, self.db.find_sources(iri).await?)? {
                return Ok(self.ids.canonical(id));
            }

            // A conflict on the shared counter is a lost round like any other.
            let id = match self.db.next_resource_id().await {
                Ok(id) => id,
                Err(e) => {
                    debug!(iri, attempt, error = %e, "counter draw failed");
                    continue;
                }
            };
            match self.db.insert_source(iri, id).await {
                Ok(()) => {
                    info!(iri, resource = id.get(), "minted resource id");
                    return Ok(self.ids.canonical(id));
                }
                Err(e) => {
                    // Unique index violation or write conflict. Either way the
                    // drawn id is abandoned and the lookup decides.
                    debug!(iri, attempt, drawn = id.get(), error = %e, "lost mint race");
                }
            }
        }

        // One last look: the final failed insert may have lost to a winner.
        if let Some(id) = single_source(iri, self.db.find_sources(iri).await?)? {
            return Ok(self.ids.canonical(id));
        }

        warn!(iri, attempts = self.max_attempts, "giving up on minting");
        Err(StoreError::MintRace {
            iri: iri.to_string(),
            attempts: self.max_attempts,
        })
    }
}

/// Interpret the Source rows found for one IRI.
fn single_source(iri: &str, rows: Vec<i64>) -> Result<Option<ResourceId>, StoreError> {
    match rows.as_slice() {
        [] => Ok(None),
        [id] => Ok(Some(ResourceId::new(*id))),
        _ => Err(StoreError::DuplicateSource {
            iri: iri.to_string(),
            count: rows.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_source_none() {
        assert_eq!(single_source("urn:a", vec![]).unwrap(), None);
    }

    #[test]
    fn test_single_source_one() {
        assert_eq!(
            single_source("urn:a", vec![17]).unwrap(),
            Some(ResourceId::new(17))
        );
    }

    #[test]
    fn test_single_source_duplicate_is_fatal() {
        let err = single_source("urn:a", vec![3, 4]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::DuplicateSource { ref iri, count: 2 } if iri == "urn:a"
        ));
        assert!(!err.is_retryable());
    }
}
