//! Transitive subgraph loading.
//!
//! Starting from a root, reference values feed a FIFO work-list. Each id moves
//! through `Pending -> Loading -> Resolved` at most once per traversal, which
//! is what keeps cycles finite.

use std::collections::{hash_map::Entry, BTreeMap, BTreeSet, HashMap, VecDeque};
use tracing::{debug, warn};

use super::db::GraphDb;
use super::error::StoreError;
use super::property::Property;
use crate::model::{ResourceId, Value};

/// One resource and its properties, ordered by predicate then position.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedResource {
    pub id: ResourceId,
    pub properties: Vec<Property>,
}

impl LoadedResource {
    /// All values of `predicate` in stored order.
    pub fn values<'a>(&'a self, predicate: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.properties
            .iter()
            .filter(move |p| p.predicate == predicate)
            .map(|p| &p.value)
    }

    /// The first value of `predicate`.
    pub fn value(&self, predicate: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|p| p.predicate == predicate)
            .map(|p| &p.value)
    }

    /// Distinct referenced ids, in first-seen order.
    pub fn references(&self) -> Vec<ResourceId> {
        let mut seen = BTreeSet::new();
        self.properties
            .iter()
            .filter_map(|p| p.value.as_resource())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Distinct predicates, sorted.
    pub fn predicates(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self.properties.iter().map(|p| p.predicate.as_str()).collect();
        set.into_iter().collect()
    }
}

/// A root resource and everything reachable from it.
#[derive(Debug)]
pub struct Graph {
    pub root: LoadedResource,
    /// Every reachable resource except the root.
    pub subgraph: BTreeMap<ResourceId, LoadedResource>,
    /// Referenced ids with no Resource row.
    pub dangling: BTreeSet<ResourceId>,
    /// Subresources whose own load failed.
    pub failures: BTreeMap<ResourceId, StoreError>,
}

impl Graph {
    /// Root id plus every subgraph id.
    pub fn ids(&self) -> BTreeSet<ResourceId> {
        std::iter::once(self.root.id)
            .chain(self.subgraph.keys().copied())
            .collect()
    }

    pub fn get(&self, id: ResourceId) -> Option<&LoadedResource> {
        if id == self.root.id {
            Some(&self.root)
        } else {
            self.subgraph.get(&id)
        }
    }

    /// Whether every reachable resource loaded cleanly.
    pub fn is_complete(&self) -> bool {
        self.dangling.is_empty() && self.failures.is_empty()
    }
}

/// Load one resource without following its references.
pub(crate) async fn load_resource(
    db: &GraphDb,
    id: ResourceId,
) -> Result<LoadedResource, StoreError> {
    if !db.resource_exists(id).await? {
        return Err(StoreError::ResourceNotFound(id));
    }

    let properties = db
        .properties_of(id)
        .await?
        .into_iter()
        .map(|row| row.into_property())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LoadedResource { id, properties })
}

/// Per-traversal state of one id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Pending,
    Loading,
    Resolved,
}

/// FIFO work-list plus the visit map. An id is queued once; only `Pending`
/// ids are handed out, so anything already seen is a cache hit with no I/O.
#[derive(Debug, Default)]
struct Agenda {
    visits: HashMap<ResourceId, Visit>,
    queue: VecDeque<ResourceId>,
}

impl Agenda {
    /// Mark the root as loading before anything is queued.
    fn seed(&mut self, root: ResourceId) {
        self.visits.insert(root, Visit::Loading);
    }

    /// Queue `id` unless it has been seen. Returns whether it was queued.
    fn discover(&mut self, id: ResourceId) -> bool {
        match self.visits.entry(id) {
            Entry::Vacant(entry) => {
                entry.insert(Visit::Pending);
                self.queue.push_back(id);
                true
            }
            Entry::Occupied(entry) => {
                debug!(resource = id.get(), state = ?entry.get(), "already visited");
                false
            }
        }
    }

    /// Next pending id, now marked loading.
    fn next(&mut self) -> Option<ResourceId> {
        while let Some(id) = self.queue.pop_front() {
            if let Some(state) = self.visits.get_mut(&id) {
                if *state == Visit::Pending {
                    *state = Visit::Loading;
                    return Some(id);
                }
            }
        }
        None
    }

    fn resolve(&mut self, id: ResourceId) {
        if let Some(state) = self.visits.get_mut(&id) {
            if *state == Visit::Loading {
                *state = Visit::Resolved;
            }
        }
    }

    #[cfg(test)]
    fn state(&self, id: ResourceId) -> Option<Visit> {
        self.visits.get(&id).copied()
    }
}

/// State of one `load_graph` call.
pub(crate) struct Traversal<'a> {
    db: &'a GraphDb,
    agenda: Agenda,
    subgraph: BTreeMap<ResourceId, LoadedResource>,
    dangling: BTreeSet<ResourceId>,
    failures: BTreeMap<ResourceId, StoreError>,
}

impl<'a> Traversal<'a> {
    pub fn new(db: &'a GraphDb) -> Self {
        Self {
            db,
            agenda: Agenda::default(),
            subgraph: BTreeMap::new(),
            dangling: BTreeSet::new(),
            failures: BTreeMap::new(),
        }
    }

    pub async fn run(mut self, root: ResourceId) -> Result<Graph, StoreError> {
        // Seeded before anything loads so references back to the root are hits.
        self.agenda.seed(root);
        let root_resource = load_resource(self.db, root).await?;
        self.agenda.resolve(root);
        self.enqueue(&root_resource);

        while let Some(id) = self.agenda.next() {
            match load_resource(self.db, id).await {
                Ok(resource) => {
                    self.enqueue(&resource);
                    self.subgraph.insert(id, resource);
                }
                Err(StoreError::ResourceNotFound(_)) => {
                    warn!(root = root.get(), resource = id.get(), "dangling reference");
                    self.dangling.insert(id);
                }
                Err(e) => {
                    warn!(root = root.get(), resource = id.get(), error = %e, "subresource load failed");
                    self.failures.insert(id, e);
                }
            }
            self.agenda.resolve(id);
        }

        debug!(
            root = root.get(),
            resources = self.subgraph.len() + 1,
            dangling = self.dangling.len(),
            failures = self.failures.len(),
            "graph loaded"
        );

        Ok(Graph {
            root: root_resource,
            subgraph: self.subgraph,
            dangling: self.dangling,
            failures: self.failures,
        })
    }

    fn enqueue(&mut self, resource: &LoadedResource) {
        for id in resource.references() {
            self.agenda.discover(id);
        }
    }
}
