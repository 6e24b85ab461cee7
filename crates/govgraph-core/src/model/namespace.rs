//! Namespaces and qualified predicate names.

use std::borrow::Cow;
use std::fmt;

/// A vocabulary namespace: a short prefix bound to a base URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace {
    prefix: Cow<'static, str>,
    uri: Cow<'static, str>,
}

impl Namespace {
    /// Create a namespace from static strings (usable in constants).
    pub const fn from_static(prefix: &'static str, uri: &'static str) -> Self {
        Self {
            prefix: Cow::Borrowed(prefix),
            uri: Cow::Borrowed(uri),
        }
    }

    /// Create a namespace.
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: Cow::Owned(prefix.into()),
            uri: Cow::Owned(uri.into()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Build a predicate in this namespace.
    pub fn term(&self, local_name: impl Into<String>) -> Predicate {
        Predicate {
            namespace: self.clone(),
            local_name: local_name.into(),
        }
    }
}

/// A qualified name: namespace plus local name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Predicate {
    namespace: Namespace,
    local_name: String,
}

impl Predicate {
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// The expanded form, e.g. `http://schema.org/name`.
    pub fn full_uri(&self) -> String {
        format!("{}{}", self.namespace.uri, self.local_name)
    }

    /// The compact form, e.g. `schema:name`.
    pub fn prefixed_uri(&self) -> String {
        format!("{}:{}", self.namespace.prefix, self.local_name)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.namespace.uri, self.local_name)
    }
}

/// Well-known vocabularies used by government data sources.
pub mod ns {
    use super::Namespace;

    pub const SCHEMA: Namespace = Namespace::from_static("schema", "http://schema.org/");
    pub const DCTERMS: Namespace = Namespace::from_static("dcterms", "http://purl.org/dc/terms/");
    pub const RDF: Namespace =
        Namespace::from_static("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#");
    pub const RDFS: Namespace =
        Namespace::from_static("rdfs", "http://www.w3.org/2000/01/rdf-schema#");
    pub const XSD: Namespace = Namespace::from_static("xsd", "http://www.w3.org/2001/XMLSchema#");
    pub const FOAF: Namespace = Namespace::from_static("foaf", "http://xmlns.com/foaf/0.1/");
    pub const ORG: Namespace = Namespace::from_static("org", "http://www.w3.org/ns/org#");
    pub const OPARL: Namespace = Namespace::from_static("oparl", "https://schema.oparl.org/1.1/");
    pub const SKOS: Namespace =
        Namespace::from_static("skos", "http://www.w3.org/2004/02/skos/core#");

    /// All well-known namespaces, longest URI first so lookups pick the most specific match.
    pub fn known() -> Vec<Namespace> {
        let mut all = vec![SCHEMA, DCTERMS, RDF, RDFS, XSD, FOAF, ORG, OPARL, SKOS];
        all.sort_by(|a, b| b.uri().len().cmp(&a.uri().len()));
        all
    }

    /// Find the well-known namespace a full URI belongs to.
    pub fn lookup(uri: &str) -> Option<Namespace> {
        known().into_iter().find(|n| {
            uri.len() > n.uri().len() && uri.starts_with(n.uri())
        })
    }

    /// Compact a full URI to `prefix:local` when its namespace is well known.
    pub fn compact(uri: &str) -> Option<String> {
        lookup(uri).map(|n| format!("{}:{}", n.prefix(), &uri[n.uri().len()..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_and_prefixed_uri() {
        let name = ns::SCHEMA.term("name");
        assert_eq!(name.full_uri(), "http://schema.org/name");
        assert_eq!(name.prefixed_uri(), "schema:name");
        assert_eq!(name.to_string(), name.full_uri());
    }

    #[test]
    fn test_custom_namespace() {
        let ris = Namespace::new("ris", "https://ris.example.org/vocab#");
        let p = ris.term("agendaItem");
        assert_eq!(p.full_uri(), "https://ris.example.org/vocab#agendaItem");
        assert_eq!(p.local_name(), "agendaItem");
        assert_eq!(p.namespace().prefix(), "ris");
    }

    #[test]
    fn test_compact() {
        assert_eq!(
            ns::compact("https://schema.oparl.org/1.1/agendaItem"),
            Some("oparl:agendaItem".to_string())
        );
        assert_eq!(ns::compact("http://schema.org/"), None);
        assert_eq!(ns::compact("https://unknown.example/x"), None);
    }
}
