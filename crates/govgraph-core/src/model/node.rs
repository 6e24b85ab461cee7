//! Node types and typed nodes.
//!
//! A [`NodeType`] owns a field registry computed once when the type is
//! built: the registries of its parents, then its own declarations, with
//! explicit removals applied last. A [`Node`] maps registry positions to
//! values and can only hold fields its type declares.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::error::ModelError;
use super::field::FieldDescriptor;
use super::namespace::Predicate;
use super::value::{FieldValue, RawValue, Relation, Value};

/// A registered node type with its composed field registry.
#[derive(Debug, PartialEq)]
pub struct NodeType {
    name: String,
    type_predicate: Option<Predicate>,
    individual: bool,
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
}

impl NodeType {
    pub fn builder(name: impl Into<String>) -> NodeTypeBuilder {
        NodeTypeBuilder {
            name: name.into(),
            type_predicate: None,
            individual: false,
            parents: Vec::new(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `rdf:type` of nodes of this type, if declared.
    pub fn type_predicate(&self) -> Option<&Predicate> {
        self.type_predicate.as_ref()
    }

    /// Individuals are enumerated, self-identifying values that are never stored.
    pub fn is_individual(&self) -> bool {
        self.individual
    }

    /// The composed registry, in serialization order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index.get(name).map(|&i| &self.fields[i])
    }
}

enum Entry {
    Field(FieldDescriptor),
    Remove(String),
}

/// Builder for [`NodeType`].
pub struct NodeTypeBuilder {
    name: String,
    type_predicate: Option<Predicate>,
    individual: bool,
    parents: Vec<Arc<NodeType>>,
    entries: Vec<Entry>,
}

impl NodeTypeBuilder {
    pub fn rdf_type(mut self, predicate: Predicate) -> Self {
        self.type_predicate = Some(predicate);
        self
    }

    /// Inherit every field of `parent`. May be called more than once.
    pub fn extends(mut self, parent: &Arc<NodeType>) -> Self {
        self.parents.push(Arc::clone(parent));
        self
    }

    /// Declare a field. A name already inherited is replaced in place.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.entries.push(Entry::Field(field));
        self
    }

    /// Drop an inherited field from this type's registry.
    pub fn remove(mut self, name: impl Into<String>) -> Self {
        self.entries.push(Entry::Remove(name.into()));
        self
    }

    pub fn individual(mut self) -> Self {
        self.individual = true;
        self
    }

    pub fn build(self) -> Arc<NodeType> {
        let mut fields: Vec<FieldDescriptor> = Vec::new();

        for parent in &self.parents {
            for field in parent.fields() {
                upsert(&mut fields, field.clone());
            }
        }
        for entry in self.entries {
            match entry {
                Entry::Field(field) => upsert(&mut fields, field),
                Entry::Remove(name) => fields.retain(|f| f.name() != name),
            }
        }

        let index = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name().to_string(), i))
            .collect();

        Arc::new(NodeType {
            name: self.name,
            type_predicate: self.type_predicate,
            individual: self.individual,
            fields,
            index,
        })
    }
}

fn upsert(fields: &mut Vec<FieldDescriptor>, field: FieldDescriptor) {
    match fields.iter_mut().find(|f| f.name() == field.name()) {
        Some(slot) => *slot = field,
        None => fields.push(field),
    }
}

/// An instance of a node type.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    node_type: Arc<NodeType>,
    source: Option<String>,
    values: BTreeMap<usize, FieldValue>,
}

impl Node {
    pub fn new(node_type: &Arc<NodeType>) -> Self {
        Self {
            node_type: Arc::clone(node_type),
            source: None,
            values: BTreeMap::new(),
        }
    }

    pub fn builder(node_type: &Arc<NodeType>) -> NodeBuilder {
        NodeBuilder {
            node: Self::new(node_type),
            error: None,
        }
    }

    pub fn node_type(&self) -> &Arc<NodeType> {
        &self.node_type
    }

    /// The external IRI this node was scraped from.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn set_source(&mut self, iri: impl Into<String>) {
        self.source = Some(iri.into());
    }

    pub fn is_individual(&self) -> bool {
        self.node_type.is_individual()
    }

    fn locate(&self, field: &str) -> Result<(usize, bool), ModelError> {
        let index = self.node_type.index.get(field).copied().ok_or_else(|| {
            ModelError::UnknownField {
                type_name: self.node_type.name.clone(),
                field: field.to_string(),
            }
        })?;
        Ok((index, self.node_type.fields[index].is_many()))
    }

    /// Assign a field. On a multi-valued field this replaces the list with one value.
    pub fn set(&mut self, field: &str, value: impl Into<RawValue>) -> Result<(), ModelError> {
        let (index, many) = self.locate(field)?;
        let value = value.into();
        let value = if many {
            FieldValue::Many(vec![value])
        } else {
            FieldValue::One(value)
        };
        self.values.insert(index, value);
        Ok(())
    }

    /// Replace a multi-valued field with `values`, keeping their order.
    pub fn set_many<I>(&mut self, field: &str, values: I) -> Result<(), ModelError>
    where
        I: IntoIterator,
        I::Item: Into<RawValue>,
    {
        let (index, many) = self.locate(field)?;
        if !many {
            return Err(ModelError::NotMultiValued {
                field: field.to_string(),
            });
        }
        let values = values.into_iter().map(Into::into).collect();
        self.values.insert(index, FieldValue::Many(values));
        Ok(())
    }

    /// Append to a multi-valued field.
    pub fn push(&mut self, field: &str, value: impl Into<RawValue>) -> Result<(), ModelError> {
        let (index, many) = self.locate(field)?;
        if !many {
            return Err(ModelError::NotMultiValued {
                field: field.to_string(),
            });
        }
        match self.values.entry(index).or_insert_with(|| FieldValue::Many(Vec::new())) {
            FieldValue::Many(values) => values.push(value.into()),
            FieldValue::One(_) => unreachable!("multi-valued fields only hold lists"),
        }
        Ok(())
    }

    pub fn clear(&mut self, field: &str) -> Result<(), ModelError> {
        let (index, _) = self.locate(field)?;
        self.values.remove(&index);
        Ok(())
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.node_type
            .index
            .get(field)
            .and_then(|index| self.values.get(index))
    }

    /// Check that every required field carries a value, here and in every
    /// inline related node.
    pub fn validate(&self) -> Result<(), ModelError> {
        for (index, field) in self.node_type.fields.iter().enumerate() {
            if !field.is_required() {
                continue;
            }
            let present = self.values.get(&index).is_some_and(|v| !v.is_empty());
            if !present {
                return Err(ModelError::Validation {
                    type_name: self.node_type.name.clone(),
                    field: field.name().to_string(),
                });
            }
        }

        for raw in self.values.values().flat_map(FieldValue::iter) {
            if let RawValue::Relation(Relation::Inline(node)) = raw {
                node.validate()?;
            }
        }
        Ok(())
    }

    /// Serialize to ordered statements plus a namespace context.
    ///
    /// Statements follow the field registry order; values of a multi-valued
    /// field keep their list order and are numbered from zero. Absent fields,
    /// empty lists and blank strings are left out.
    pub fn serialize(&self) -> Result<NodeDocument, ModelError> {
        let mut statements = Vec::new();
        let mut context = BTreeMap::new();

        if let Some(predicate) = &self.node_type.type_predicate {
            bind_prefix(&mut context, predicate);
        }

        for (index, field) in self.node_type.fields.iter().enumerate() {
            let Some(value) = self.values.get(&index) else {
                continue;
            };
            let predicate = field.full_uri();
            let before = statements.len();

            match value {
                FieldValue::One(raw) => {
                    let value = field.serialize(raw)?;
                    if !value.is_blank() {
                        statements.push(Statement {
                            predicate,
                            value,
                            order: None,
                        });
                    }
                }
                FieldValue::Many(raws) => {
                    let mut order = 0;
                    for raw in raws {
                        let value = field.serialize(raw)?;
                        if value.is_blank() {
                            continue;
                        }
                        statements.push(Statement {
                            predicate: predicate.clone(),
                            value,
                            order: Some(order),
                        });
                        order += 1;
                    }
                }
            }

            if statements.len() > before {
                bind_prefix(&mut context, field.predicate());
            }
            for statement in &statements[before..] {
                if let Value::Inline(doc) = &statement.value {
                    for (prefix, uri) in &doc.context {
                        context.entry(prefix.clone()).or_insert_with(|| uri.clone());
                    }
                }
            }
        }

        Ok(NodeDocument {
            type_name: self.node_type.name.clone(),
            type_uri: self.node_type.type_predicate.as_ref().map(Predicate::full_uri),
            source: self.source.clone(),
            statements,
            context,
        })
    }
}

fn bind_prefix(context: &mut BTreeMap<String, String>, predicate: &Predicate) {
    let namespace = predicate.namespace();
    context
        .entry(namespace.prefix().to_string())
        .or_insert_with(|| namespace.uri().to_string());
}

/// Builds a [`Node`]; the first invalid assignment is reported by [`NodeBuilder::build`].
pub struct NodeBuilder {
    node: Node,
    error: Option<ModelError>,
}

impl NodeBuilder {
    pub fn source(mut self, iri: impl Into<String>) -> Self {
        self.node.set_source(iri);
        self
    }

    pub fn set(mut self, field: &str, value: impl Into<RawValue>) -> Self {
        if self.error.is_none() {
            self.error = self.node.set(field, value).err();
        }
        self
    }

    pub fn set_many<I>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<RawValue>,
    {
        if self.error.is_none() {
            self.error = self.node.set_many(field, values).err();
        }
        self
    }

    pub fn push(mut self, field: &str, value: impl Into<RawValue>) -> Self {
        if self.error.is_none() {
            self.error = self.node.push(field, value).err();
        }
        self
    }

    pub fn build(self) -> Result<Node, ModelError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.node),
        }
    }
}

/// One serialized (predicate, value) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub predicate: String,
    pub value: Value,
    /// Position within a multi-valued predicate; `None` for single values.
    pub order: Option<u32>,
}

/// The serialized form of a node, shared by persistence and rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDocument {
    pub type_name: String,
    pub type_uri: Option<String>,
    pub source: Option<String>,
    pub statements: Vec<Statement>,
    /// Prefix to namespace URI for every namespace used.
    pub context: BTreeMap<String, String>,
}

impl NodeDocument {
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.statements
            .iter()
            .map(|s| (s.predicate.as_str(), &s.value))
    }

    pub fn values<'a>(&'a self, predicate: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.statements
            .iter()
            .filter(move |s| s.predicate == predicate)
            .map(|s| &s.value)
    }
}
