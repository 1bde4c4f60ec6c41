use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::field_tree::ChildrenPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuilderConfig {
    pub children_policy: ChildrenPolicy,
    pub preview_indent: usize,
    /// Seed one empty string field when no initial data is given.
    pub default_field: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            children_policy: ChildrenPolicy::Discard,
            preview_indent: 2,
            default_field: true,
        }
    }
}

impl BuilderConfig {
    pub fn from_yaml_str(input: &str) -> Result<Self, ConfigError> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_yaml_str(raw.as_str())
    }
}
