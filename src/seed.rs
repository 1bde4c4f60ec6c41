use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::core::field::FieldNode;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON seed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML seed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedFormat {
    Json,
    Yaml,
}

impl SeedFormat {
    /// `.json` files are JSON, anything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Object form of a seed, as stored by a previous session:
/// `{ "schemaFields": [...] }` or `{ "fields": [...] }`.
#[derive(Deserialize)]
struct WrappedSeed {
    #[serde(alias = "schemaFields")]
    fields: Vec<FieldNode>,
}

/// A seed is either a bare list of fields or a [`WrappedSeed`]. The shape is
/// picked from the top-level value first so a bad field reports its own
/// error instead of a generic mismatch.
pub fn parse_seed(input: &str, format: SeedFormat) -> Result<Vec<FieldNode>, SeedError> {
    let fields = match format {
        SeedFormat::Json => {
            let value: serde_json::Value = serde_json::from_str(input)?;
            if value.is_array() {
                serde_json::from_value(value)?
            } else {
                serde_json::from_value::<WrappedSeed>(value)?.fields
            }
        }
        SeedFormat::Yaml => {
            let value: serde_yaml::Value = serde_yaml::from_str(input)?;
            if value.is_sequence() {
                serde_yaml::from_value(value)?
            } else {
                serde_yaml::from_value::<WrappedSeed>(value)?.fields
            }
        }
    };
    Ok(fields)
}

pub fn load_seed(path: impl AsRef<Path>) -> Result<Vec<FieldNode>, SeedError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    parse_seed(raw.as_str(), SeedFormat::from_path(path))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{SeedError, SeedFormat, parse_seed};
    use crate::core::field::FieldKind;

    #[test]
    fn format_follows_extension() {
        assert_eq!(SeedFormat::from_path(Path::new("a.JSON")), SeedFormat::Json);
        assert_eq!(SeedFormat::from_path(Path::new("a.yaml")), SeedFormat::Yaml);
        assert_eq!(SeedFormat::from_path(Path::new("seed")), SeedFormat::Yaml);
    }

    #[test]
    fn parses_bare_json_list() {
        let fields = parse_seed(
            r#"[{"id":"1","key":"name","type":"string"},{"key":"tags","type":"nested","children":[{"key":"x","type":"number"}]}]"#,
            SeedFormat::Json,
        )
        .expect("seed");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].id.as_str(), "1");
        assert_eq!(fields[1].children()[0].kind, FieldKind::Number);
    }

    #[test]
    fn parses_wrapped_yaml() {
        let yaml = "schemaFields:\n  - key: address\n    type: nested\n    children:\n      - key: city\n";
        let fields = parse_seed(yaml, SeedFormat::Yaml).expect("seed");
        assert_eq!(fields[0].key, "address");
        assert_eq!(fields[0].children()[0].kind, FieldKind::String);

        let json = r#"{"fields":[{"key":"a","type":"number"}]}"#;
        let fields = parse_seed(json, SeedFormat::Json).expect("seed");
        assert_eq!(fields[0].kind, FieldKind::Number);
    }

    #[test]
    fn rejects_unknown_type_tag() {
        let err = parse_seed(r#"[{"key":"a","type":"date"}]"#, SeedFormat::Json)
            .expect_err("unknown type");
        assert!(matches!(err, SeedError::Json(_)));
        assert!(err.to_string().contains("unknown variant `date`"), "{err}");

        let err =
            parse_seed("- key: a\n  type: date\n", SeedFormat::Yaml).expect_err("unknown type");
        assert!(err.to_string().contains("unknown variant `date`"), "{err}");
    }

    #[test]
    fn wrapped_seed_reports_field_errors() {
        let wrapped = r#"{"schemaFields":[{"key":"a","type":"list"}]}"#;
        let err = parse_seed(wrapped, SeedFormat::Json).expect_err("unknown type");
        assert!(err.to_string().contains("unknown variant `list`"), "{err}");

        let err = parse_seed(r#"{"rows":[]}"#, SeedFormat::Json).expect_err("no fields");
        assert!(err.to_string().contains("missing field `fields`"), "{err}");
    }
}
