use indexmap::IndexMap;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::core::field::FieldNode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PreviewValue {
    Label(&'static str),
    Object(Preview),
}

impl PreviewValue {
    pub fn as_label(&self) -> Option<&'static str> {
        match self {
            Self::Label(label) => Some(*label),
            Self::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&Preview> {
        match self {
            Self::Object(preview) => Some(preview),
            Self::Label(_) => None,
        }
    }
}

/// JSON-shaped skeleton of a field tree. Entry order follows the first
/// occurrence of each key during traversal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Preview {
    entries: IndexMap<String, PreviewValue>,
}

impl Preview {
    pub fn get(&self, key: &str) -> Option<&PreviewValue> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PreviewValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

/// Projects fields depth-first. Nested fields with children become objects,
/// everything else (including childless nested fields) maps to the uppercase
/// type label. Repeated sibling keys resolve last-write-wins.
pub fn project(fields: &[FieldNode]) -> Preview {
    let mut entries = IndexMap::with_capacity(fields.len());
    for field in fields {
        let children = field.children();
        let value = if field.is_nested() && !children.is_empty() {
            PreviewValue::Object(project(children))
        } else {
            PreviewValue::Label(field.kind.label())
        };
        entries.insert(field.key.clone(), value);
    }
    Preview { entries }
}

/// Pretty JSON with `indent` spaces per level; `0` renders compactly.
pub fn render_json(preview: &Preview, indent: usize) -> String {
    if indent == 0 {
        return serde_json::to_string(preview).unwrap_or_default();
    }
    let indent = " ".repeat(indent);
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    if preview.serialize(&mut serializer).is_err() {
        return String::new();
    }
    String::from_utf8(out).unwrap_or_default()
}
