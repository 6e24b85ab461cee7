//! Property rows and per-node saves.
//!
//! In memory a property value is a tagged [`Value`]. In the database it is a
//! wide row with one nullable column per kind, exactly one of them set. The
//! mapping between the two lives here and nowhere else.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

use super::db::GraphDb;
use super::error::StoreError;
use super::identity::IdentityResolver;
use crate::model::{ns, CanonicalId, Node, NodeDocument, ResourceId, Statement, Value, ValueKind};

/// One row of the `property` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PropertyRow {
    pub resource_id: i64,
    pub predicate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_resource: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_integer: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_float: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_datetime: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_url: Option<String>,
    /// JSON text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_json: Option<String>,
}

impl PropertyRow {
    /// Map a statement to a row. `resource_id` is left for the caller to set.
    pub fn classify(statement: &Statement) -> Result<Self, StoreError> {
        let mut row = PropertyRow {
            predicate: statement.predicate.clone(),
            position: statement.order,
            ..Default::default()
        };

        match &statement.value {
            Value::Resource(id) => row.value_resource = Some(id.get()),
            Value::Boolean(b) => row.value_boolean = Some(*b),
            Value::Integer(i) => row.value_integer = Some(*i),
            Value::Float(x) => row.value_float = Some(*x),
            Value::Datetime(ts) => row.value_datetime = Some(*ts),
            Value::String(s) => row.value_string = Some(s.clone()),
            Value::Url(u) => row.value_url = Some(u.clone()),
            Value::Json(v) => row.value_json = Some(v.to_string()),
            other => {
                return Err(StoreError::UnmappableValue {
                    predicate: statement.predicate.clone(),
                    kind: other.kind(),
                })
            }
        }

        Ok(row)
    }

    /// Number of populated value slots.
    pub fn populated(&self) -> usize {
        [
            self.value_resource.is_some(),
            self.value_boolean.is_some(),
            self.value_integer.is_some(),
            self.value_float.is_some(),
            self.value_datetime.is_some(),
            self.value_string.is_some(),
            self.value_url.is_some(),
            self.value_json.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    /// Flatten a stored row back to a typed property.
    pub fn into_property(self) -> Result<Property, StoreError> {
        let resource = ResourceId::new(self.resource_id);
        let populated = self.populated();
        if populated != 1 {
            return Err(StoreError::MalformedProperty {
                resource,
                predicate: self.predicate,
                reason: format!("{} populated value slots", populated),
            });
        }

        let value = if let Some(id) = self.value_resource {
            Value::Resource(ResourceId::new(id))
        } else if let Some(b) = self.value_boolean {
            Value::Boolean(b)
        } else if let Some(i) = self.value_integer {
            Value::Integer(i)
        } else if let Some(x) = self.value_float {
            Value::Float(x)
        } else if let Some(ts) = self.value_datetime {
            Value::Datetime(ts)
        } else if let Some(s) = self.value_string {
            Value::String(s)
        } else if let Some(u) = self.value_url {
            Value::Url(u)
        } else if let Some(text) = self.value_json {
            let json = serde_json::from_str(&text).map_err(|e| StoreError::MalformedProperty {
                resource,
                predicate: self.predicate.clone(),
                reason: format!("invalid JSON: {}", e),
            })?;
            Value::Json(json)
        } else {
            unreachable!("exactly one slot is populated")
        };

        Ok(Property {
            predicate: self.predicate,
            order: self.position,
            value,
        })
    }
}

/// A typed property as loaded from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub predicate: String,
    pub order: Option<u32>,
    pub value: Value,
}

/// Result of saving one node.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// Properties were written for this resource.
    Stored(CanonicalId),
    /// The node is an individual; its identity is its serialized form.
    Individual,
}

impl SaveOutcome {
    pub fn id(&self) -> Option<ResourceId> {
        match self {
            SaveOutcome::Stored(canonical) => Some(canonical.id),
            SaveOutcome::Individual => None,
        }
    }
}

/// One resource write, planned before any I/O.
#[derive(Debug)]
struct PlannedWrite<'d> {
    iri: &'d str,
    type_name: &'d str,
    rows: Vec<PlannedRow<'d>>,
}

#[derive(Debug)]
enum PlannedRow<'d> {
    Ready(PropertyRow),
    /// Reference to an inline node written earlier in the same save.
    Embedded {
        predicate: &'d str,
        order: Option<u32>,
        iri: &'d str,
    },
}

/// Plan the write of `document`. Inline nodes are planned into `children`
/// ahead of the node that embeds them, so they are written first.
fn plan<'d>(
    iri: &'d str,
    document: &'d NodeDocument,
    children: &mut Vec<PlannedWrite<'d>>,
) -> Result<PlannedWrite<'d>, StoreError> {
    let mut rows = Vec::with_capacity(document.statements.len() + 1);
    if let Some(uri) = &document.type_uri {
        rows.push(PlannedRow::Ready(PropertyRow {
            predicate: ns::RDF.term("type").full_uri(),
            value_url: Some(uri.clone()),
            ..Default::default()
        }));
    }

    for statement in &document.statements {
        let Value::Inline(embedded) = &statement.value else {
            rows.push(PlannedRow::Ready(PropertyRow::classify(statement)?));
            continue;
        };
        let child_iri = embedded
            .source
            .as_deref()
            .ok_or_else(|| StoreError::UnmappableValue {
                predicate: statement.predicate.clone(),
                kind: ValueKind::Inline,
            })?;
        let child = plan(child_iri, embedded, children)?;
        children.push(child);
        rows.push(PlannedRow::Embedded {
            predicate: &statement.predicate,
            order: statement.order,
            iri: child_iri,
        });
    }

    Ok(PlannedWrite {
        iri,
        type_name: &document.type_name,
        rows,
    })
}

/// Writes a node's properties, replacing them predicate by predicate.
pub(crate) struct PropertyWriter<'a> {
    db: &'a GraphDb,
    resolver: IdentityResolver<'a>,
    max_attempts: u32,
}

impl<'a> PropertyWriter<'a> {
    pub fn new(db: &'a GraphDb, resolver: IdentityResolver<'a>, max_attempts: u32) -> Self {
        Self {
            db,
            resolver,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Save `node` and every inline node it embeds.
    ///
    /// Inline nodes are stored as resources of their own and referenced by id.
    pub async fn save(&self, node: &Node) -> Result<SaveOutcome, StoreError> {
        node.validate()?;

        if node.is_individual() {
            debug!(node_type = node.node_type().name(), "skipping individual");
            return Ok(SaveOutcome::Individual);
        }

        let iri = node.source().ok_or_else(|| StoreError::MissingSource {
            type_name: node.node_type().name().to_string(),
        })?;

        // Everything that can fail without I/O fails here, before any write.
        let document = node.serialize()?;
        let mut children = Vec::new();
        let root = plan(iri, &document, &mut children)?;

        let mut saved: HashMap<&str, ResourceId> = HashMap::new();
        for child in &children {
            let canonical = self.write(child, &saved).await?;
            saved.insert(child.iri, canonical.id);
        }
        let canonical = self.write(&root, &saved).await?;

        Ok(SaveOutcome::Stored(canonical))
    }

    async fn write(
        &self,
        planned: &PlannedWrite<'_>,
        saved: &HashMap<&str, ResourceId>,
    ) -> Result<CanonicalId, StoreError> {
        let canonical = self.resolver.resolve(planned.iri).await?;
        if !self.db.resource_exists(canonical.id).await? {
            return Err(StoreError::MissingResource(canonical.id));
        }

        let resource_id = canonical.id.get();
        let rows = planned
            .rows
            .iter()
            .map(|row| match row {
                PlannedRow::Ready(row) => Ok(PropertyRow {
                    resource_id,
                    ..row.clone()
                }),
                PlannedRow::Embedded {
                    predicate,
                    order,
                    iri,
                } => {
                    let target = saved.get(iri).ok_or_else(|| {
                        StoreError::Database(format!("inline node {} was not saved", iri))
                    })?;
                    Ok(PropertyRow {
                        resource_id,
                        predicate: predicate.to_string(),
                        position: *order,
                        value_resource: Some(target.get()),
                        ..Default::default()
                    })
                }
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        let predicates: BTreeSet<String> = rows.iter().map(|r| r.predicate.clone()).collect();
        let predicates: Vec<String> = predicates.into_iter().collect();

        let (predicate_count, row_count) = (predicates.len(), rows.len());
        if !rows.is_empty() {
            self.replace(canonical.id, predicates, rows).await?;
        }

        info!(
            resource = %canonical,
            node_type = planned.type_name,
            predicates = predicate_count,
            rows = row_count,
            "saved node"
        );

        Ok(canonical)
    }

    /// Run the replace transaction, retrying when it fails to commit.
    ///
    /// Concurrent saves of one resource conflict on the resource row, so the
    /// loser rolls back whole and tries again against the committed state.
    async fn replace(
        &self,
        resource: ResourceId,
        predicates: Vec<String>,
        rows: Vec<PropertyRow>,
    ) -> Result<(), StoreError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self
                .db
                .replace_properties(resource, predicates.clone(), rows.clone())
                .await
            {
                Ok(()) => return Ok(()),
                Err(StoreError::Database(reason)) if attempt < self.max_attempts => {
                    debug!(resource = resource.get(), attempt, %reason, "property write failed, retrying");
                    tokio::task::yield_now().await;
                }
                Err(StoreError::Database(reason)) => {
                    warn!(resource = resource.get(), attempts = attempt, %reason, "giving up on property write");
                    return Err(StoreError::WriteConflict {
                        resource,
                        attempts: attempt,
                        reason,
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }
}
