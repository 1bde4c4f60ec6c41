use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::FieldId;
use crate::core::error::SchemaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    String,
    Number,
    Nested,
}

impl FieldKind {
    pub const ALL: [FieldKind; 3] = [FieldKind::String, FieldKind::Number, FieldKind::Nested];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Nested => "nested",
        }
    }

    /// Uppercase label used by the preview for fields without projected children.
    pub fn label(self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Number => "NUMBER",
            Self::Nested => "NESTED",
        }
    }

    pub fn is_nested(self) -> bool {
        matches!(self, Self::Nested)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SchemaError::InvalidType(s.to_string()))
    }
}

/// Owned snapshot of one field and its subtree.
///
/// `children` is `Some` exactly when `kind` is [`FieldKind::Nested`] in
/// snapshots produced by the tree. Seeds may carry children on leaf fields;
/// the tree decides what happens to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNode {
    #[serde(default = "FieldId::generate")]
    pub id: FieldId,
    #[serde(default)]
    pub key: String,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FieldNode>>,
}

impl FieldNode {
    pub fn new(key: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: FieldId::generate(),
            key: key.into(),
            kind,
            children: kind.is_nested().then(Vec::new),
        }
    }

    pub fn string(key: impl Into<String>) -> Self {
        Self::new(key, FieldKind::String)
    }

    pub fn number(key: impl Into<String>) -> Self {
        Self::new(key, FieldKind::Number)
    }

    pub fn nested(key: impl Into<String>, children: Vec<FieldNode>) -> Self {
        Self {
            children: Some(children),
            ..Self::new(key, FieldKind::Nested)
        }
    }

    pub fn with_id(mut self, id: impl Into<FieldId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn is_nested(&self) -> bool {
        self.kind.is_nested()
    }

    /// Children that take part in the shape. Leaf fields have none, whatever
    /// they carry.
    pub fn children(&self) -> &[FieldNode] {
        if !self.is_nested() {
            return &[];
        }
        self.children.as_deref().unwrap_or_default()
    }
}

impl Default for FieldNode {
    fn default() -> Self {
        Self::new("", FieldKind::String)
    }
}
