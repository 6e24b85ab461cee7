//! Canonical resource identifiers and their external textual form.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Internally minted identifier of a Resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(i64);

impl ResourceId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Formats and parses the external identifier form `<id-namespace>/<integer>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdTemplate {
    namespace: String,
}

impl IdTemplate {
    pub fn new(namespace: impl Into<String>) -> Self {
        let namespace = namespace.into().trim_end_matches('/').to_string();
        Self { namespace }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn format(&self, id: ResourceId) -> String {
        format!("{}/{}", self.namespace, id.get())
    }

    /// Parse an external id, or a bare integer.
    pub fn parse(&self, text: &str) -> Option<ResourceId> {
        let text = text.trim();
        let digits = match text.strip_prefix(self.namespace.as_str()) {
            Some(rest) => rest.strip_prefix('/')?,
            None => text,
        };
        digits.parse::<i64>().ok().map(ResourceId)
    }

    pub fn canonical(&self, id: ResourceId) -> CanonicalId {
        CanonicalId {
            id,
            external: self.format(id),
        }
    }
}

/// A resolved canonical identifier together with its external form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalId {
    pub id: ResourceId,
    pub external: String,
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.external)
    }
}
