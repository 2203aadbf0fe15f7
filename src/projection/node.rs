//! Untyped source tree returned by the upstream service.

use serde_json::Value;

use crate::projection::output::{OutputDocument, OutputValue};

/// A node of the dynamically shaped upstream result.
///
/// Maps keep their source order and may hold repeated names; lookups return
/// the first occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceNode {
    /// Leaf text value.
    Scalar(String),
    /// Named children in source order.
    Map(Vec<(String, SourceNode)>),
    /// Ordered elements.
    Sequence(Vec<SourceNode>),
}

impl SourceNode {
    /// Look up a field, or `None` if it is absent or `self` is not a map.
    pub fn get(&self, field: &str) -> Option<&SourceNode> {
        match self {
            SourceNode::Map(entries) => entries
                .iter()
                .find(|(name, _)| name == field)
                .map(|(_, node)| node),
            _ => None,
        }
    }

    /// Short variant name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceNode::Scalar(_) => "scalar",
            SourceNode::Map(_) => "map",
            SourceNode::Sequence(_) => "sequence",
        }
    }

    pub fn scalar(text: impl Into<String>) -> Self {
        SourceNode::Scalar(text.into())
    }
}

/// JSON conversion, mostly for fixtures.
///
/// `null` object members are treated as absent; numbers and booleans become
/// their textual form.
impl From<Value> for SourceNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => SourceNode::Scalar(String::new()),
            Value::Bool(b) => SourceNode::Scalar(b.to_string()),
            Value::Number(n) => SourceNode::Scalar(n.to_string()),
            Value::String(s) => SourceNode::Scalar(s),
            Value::Array(items) => {
                SourceNode::Sequence(items.into_iter().map(SourceNode::from).collect())
            }
            Value::Object(members) => SourceNode::Map(
                members
                    .into_iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(k, v)| (k, SourceNode::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&OutputValue> for SourceNode {
    fn from(value: &OutputValue) -> Self {
        match value {
            OutputValue::String(s) => SourceNode::Scalar(s.clone()),
            OutputValue::Document(doc) => SourceNode::from(doc),
            OutputValue::List(items) => {
                SourceNode::Sequence(items.iter().map(SourceNode::from).collect())
            }
        }
    }
}

impl From<&OutputDocument> for SourceNode {
    fn from(doc: &OutputDocument) -> Self {
        SourceNode::Map(
            doc.iter()
                .map(|(name, value)| (name.to_string(), SourceNode::from(value)))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_returns_first_match() {
        let node = SourceNode::Map(vec![
            ("crs".into(), SourceNode::scalar("LDS")),
            ("crs".into(), SourceNode::scalar("KGX")),
        ]);
        assert_eq!(node.get("crs"), Some(&SourceNode::scalar("LDS")));
        assert_eq!(node.get("via"), None);
    }

    #[test]
    fn test_get_on_non_map_is_absent() {
        assert_eq!(SourceNode::scalar("x").get("x"), None);
        assert_eq!(SourceNode::Sequence(vec![]).get("x"), None);
    }

    #[test]
    fn test_from_json() {
        let node = SourceNode::from(json!({
            "crs": "LDS",
            "platform": null,
            "numRows": 50,
            "services": [{"sta": "10:05"}],
        }));

        assert_eq!(node.get("crs"), Some(&SourceNode::scalar("LDS")));
        assert_eq!(node.get("platform"), None);
        assert_eq!(node.get("numRows"), Some(&SourceNode::scalar("50")));
        assert_eq!(node.get("services").map(SourceNode::kind), Some("sequence"));
    }
}
