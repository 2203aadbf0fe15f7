//! Projected output documents.
//!
//! Serialization preserves insertion order, which is the declared rule order
//! of the shape that produced the document.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A projected value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputValue {
    String(String),
    Document(OutputDocument),
    List(Vec<OutputValue>),
}

/// An ordered mapping of field name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputDocument {
    fields: Vec<(String, OutputValue)>,
}

impl OutputDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, value: OutputValue) {
        self.fields.push((field.into(), value));
    }

    pub fn get(&self, field: &str) -> Option<&OutputValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Field names in output order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OutputValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl OutputValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OutputValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[OutputValue]> {
        match self {
            OutputValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&OutputDocument> {
        match self {
            OutputValue::Document(doc) => Some(doc),
            _ => None,
        }
    }
}

impl Serialize for OutputDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for OutputValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OutputValue::String(s) => serializer.serialize_str(s),
            OutputValue::Document(doc) => doc.serialize(serializer),
            OutputValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}
