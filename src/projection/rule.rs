//! Extraction rules and the object/collection projectors built from them.

use std::sync::Arc;

use crate::projection::convert::Converter;
use crate::projection::error::{ProjectionError, ProjectionErrorKind, ProjectionResult};
use crate::projection::node::SourceNode;
use crate::projection::output::{OutputDocument, OutputValue};

/// How a single source value becomes an output value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projector {
    /// A scalar leaf.
    Value(Converter),
    /// A nested object.
    Object(Arc<ObjectShape>),
    /// A sequence whose elements all use the inner projector.
    List(Box<Projector>),
}

impl Projector {
    pub fn text() -> Self {
        Projector::Value(Converter::Text)
    }

    pub fn timestamp() -> Self {
        Projector::Value(Converter::Timestamp)
    }

    pub fn object(shape: &Arc<ObjectShape>) -> Self {
        Projector::Object(Arc::clone(shape))
    }

    pub fn list(element: Projector) -> Self {
        Projector::List(Box::new(element))
    }

    /// Project a present value.
    pub fn apply(&self, node: &SourceNode) -> ProjectionResult<OutputValue> {
        match self {
            Projector::Value(converter) => converter.convert(node),
            Projector::Object(shape) => shape.project(node).map(OutputValue::Document),
            Projector::List(element) => project_sequence(node, element).map(OutputValue::List),
        }
    }

    #[cfg(test)]
    fn is_collection(&self) -> bool {
        matches!(self, Projector::List(_))
    }
}

/// Whether a rule's field is emitted when the source lacks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Omitted when absent.
    IfPresent,
    /// Always emitted; only collections use this and become `[]` when absent.
    Always,
}

/// A named field and the projector applied to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    field: &'static str,
    projector: Projector,
    presence: Presence,
}

impl Rule {
    pub fn new(field: &'static str, projector: Projector) -> Self {
        Self {
            field,
            projector,
            presence: Presence::IfPresent,
        }
    }

    pub fn text(field: &'static str) -> Self {
        Self::new(field, Projector::text())
    }

    pub fn timestamp(field: &'static str) -> Self {
        Self::new(field, Projector::timestamp())
    }

    /// A collection field that is always emitted, as `[]` when absent.
    pub fn list(field: &'static str, element: Projector) -> Self {
        Self {
            field,
            projector: Projector::list(element),
            presence: Presence::Always,
        }
    }

    /// A collection field that is omitted when absent.
    pub fn optional_list(field: &'static str, element: Projector) -> Self {
        Self::new(field, Projector::list(element))
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn presence(&self) -> Presence {
        self.presence
    }

    /// Extract this rule's field from `node`.
    ///
    /// Returns `None` when the field is absent, unless the rule is an
    /// always-present collection.
    pub fn extract(&self, node: &SourceNode) -> ProjectionResult<Option<OutputValue>> {
        if let (Projector::List(element), Presence::Always) = (&self.projector, self.presence) {
            return project_list(node, self.field, element).map(|items| Some(OutputValue::List(items)));
        }

        match node.get(self.field) {
            None => Ok(None),
            Some(value) => self
                .projector
                .apply(value)
                .map(Some)
                .map_err(|e| e.in_field(self.field)),
        }
    }
}

/// An ordered list of rules describing one output document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectShape {
    name: &'static str,
    rules: Vec<Rule>,
}

impl ObjectShape {
    pub fn new(name: &'static str, rules: Vec<Rule>) -> Self {
        Self { name, rules }
    }

    #[cfg(test)]
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Field names of all collection rules.
    #[cfg(test)]
    pub fn collection_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules
            .iter()
            .filter(|r| r.projector.is_collection())
            .map(|r| r.field)
    }

    /// Project `node` into a document whose fields follow rule order.
    pub fn project(&self, node: &SourceNode) -> ProjectionResult<OutputDocument> {
        if !matches!(node, SourceNode::Map(_)) {
            return Err(ProjectionError::new(ProjectionErrorKind::ExpectedObject {
                shape: self.name,
                found: node.kind(),
            }));
        }

        let mut doc = OutputDocument::new();
        for rule in &self.rules {
            if let Some(value) = rule.extract(node)? {
                doc.push(rule.field, value);
            }
        }
        Ok(doc)
    }
}

/// Project every element of the collection `field` of `node`.
///
/// An absent field yields an empty list. A present field must hold a
/// sequence; the result has the same length and order.
pub fn project_list(
    node: &SourceNode,
    field: &str,
    element: &Projector,
) -> ProjectionResult<Vec<OutputValue>> {
    match node.get(field) {
        None => Ok(Vec::new()),
        Some(value) => project_sequence(value, element).map_err(|e| e.in_field(field)),
    }
}

fn project_sequence(node: &SourceNode, element: &Projector) -> ProjectionResult<Vec<OutputValue>> {
    let items = match node {
        SourceNode::Sequence(items) => items,
        other => {
            return Err(ProjectionError::new(
                ProjectionErrorKind::MalformedCollection { found: other.kind() },
            ))
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| element.apply(item).map_err(|e| e.at_index(i)))
        .collect()
}
