use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::FieldId;
use crate::core::error::SchemaError;
use crate::core::field::FieldNode;
use crate::core::field_path::FieldPath;
use crate::core::form_state::FormState;

/// One structural edit, as a presentation layer or an edit script issues it.
///
/// The type tag of `Retype` stays a raw string so unknown types are rejected
/// when the edit is applied, not when it is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum FieldEdit {
    Add {
        #[serde(default)]
        parent: FieldPath,
    },
    Remove {
        path: FieldPath,
    },
    Rename {
        path: FieldPath,
        #[serde(default)]
        key: String,
    },
    Retype {
        path: FieldPath,
        #[serde(rename = "type")]
        kind: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Added(FieldId),
    Removed(FieldNode),
    Updated,
    /// The edit addressed nothing; the form is unchanged.
    Unresolved,
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

impl FormState {
    pub fn apply(&mut self, edit: &FieldEdit) -> Result<EditOutcome, SchemaError> {
        let outcome = match edit {
            FieldEdit::Add { parent } => self
                .add_field(parent)
                .map_or(EditOutcome::Unresolved, EditOutcome::Added),
            FieldEdit::Remove { path } => self
                .remove_field(path)
                .map_or(EditOutcome::Unresolved, EditOutcome::Removed),
            FieldEdit::Rename { path, key } => updated(self.update_key(path, key.as_str())),
            FieldEdit::Retype { path, kind } => updated(self.update_type(path, kind)?),
        };
        Ok(outcome)
    }
}

fn updated(applied: bool) -> EditOutcome {
    if applied {
        EditOutcome::Updated
    } else {
        EditOutcome::Unresolved
    }
}

impl fmt::Display for FieldEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add { parent } if parent.is_root() => f.write_str("add"),
            Self::Add { parent } => write!(f, "add:{parent}"),
            Self::Remove { path } => write!(f, "remove:{path}"),
            Self::Rename { path, key } => write!(f, "rename:{path}={key}"),
            Self::Retype { path, kind } => write!(f, "retype:{path}={kind}"),
        }
    }
}

/// Compact form used on the command line: `add`, `add:1`, `remove:0.2`,
/// `rename:0=name`, `retype:1=nested`.
impl FromStr for FieldEdit {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (op, rest) = s.split_once(':').unwrap_or((s, ""));
        let edit = match op.trim() {
            "add" => FieldEdit::Add {
                parent: FieldPath::parse(rest)?,
            },
            "remove" => FieldEdit::Remove {
                path: FieldPath::parse(rest)?,
            },
            "rename" => {
                let (path, key) = split_assignment(s, rest)?;
                FieldEdit::Rename {
                    path,
                    key: key.to_string(),
                }
            }
            "retype" => {
                let (path, kind) = split_assignment(s, rest)?;
                FieldEdit::Retype {
                    path,
                    kind: kind.trim().to_string(),
                }
            }
            _ => return Err(SchemaError::InvalidEdit(s.to_string())),
        };
        Ok(edit)
    }
}

fn split_assignment<'a>(raw: &str, rest: &'a str) -> Result<(FieldPath, &'a str), SchemaError> {
    let Some((path, value)) = rest.split_once('=') else {
        return Err(SchemaError::InvalidEdit(raw.to_string()));
    };
    let path = FieldPath::parse(path)?;
    if path.is_root() {
        return Err(SchemaError::InvalidEdit(raw.to_string()));
    }
    Ok((path, value))
}

#[cfg(test)]
mod tests {
    use super::{EditOutcome, FieldEdit};
    use crate::config::BuilderConfig;
    use crate::core::error::SchemaError;
    use crate::core::field_path::FieldPath;
    use crate::core::form_state::FormState;

    #[test]
    fn parse_inline_edits() {
        assert_eq!(
            "add".parse::<FieldEdit>(),
            Ok(FieldEdit::Add {
                parent: FieldPath::root()
            })
        );
        assert_eq!(
            "remove:1.0".parse::<FieldEdit>(),
            Ok(FieldEdit::Remove {
                path: FieldPath::from([1, 0])
            })
        );
        assert_eq!(
            "rename:0=first name".parse::<FieldEdit>(),
            Ok(FieldEdit::Rename {
                path: FieldPath::from([0]),
                key: "first name".to_string()
            })
        );
        assert_eq!(
            "rename:0=".parse::<FieldEdit>(),
            Ok(FieldEdit::Rename {
                path: FieldPath::from([0]),
                key: String::new()
            })
        );
        assert!("rename:0".parse::<FieldEdit>().is_err());
        assert!("retype:=nested".parse::<FieldEdit>().is_err());
        assert!("move:0".parse::<FieldEdit>().is_err());
        assert!(matches!(
            "remove:x".parse::<FieldEdit>(),
            Err(SchemaError::InvalidPath(_))
        ));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for raw in ["add", "add:1", "remove:0.2", "rename:0=name", "retype:1=nested"] {
            let edit: FieldEdit = raw.parse().expect("edit");
            assert_eq!(edit.to_string(), raw);
        }
    }

    #[test]
    fn script_edits_deserialize_from_yaml() {
        let yaml = r#"
- op: add
- op: rename
  path: [1]
  key: address
- op: retype
  path: [1]
  type: nested
- op: add
  parent: [1]
- op: remove
  path: [0]
"#;
        let edits: Vec<FieldEdit> = serde_yaml::from_str(yaml).expect("edits");
        assert_eq!(edits.len(), 5);
        assert_eq!(
            edits[3],
            FieldEdit::Add {
                parent: FieldPath::from([1])
            }
        );
    }

    #[test]
    fn apply_runs_a_script() {
        let mut state = FormState::new(None, &BuilderConfig::default()).expect("state");
        let script = [
            "rename:0=name",
            "add",
            "rename:1=address",
            "retype:1=nested",
            "add:1",
            "rename:1.0=city",
        ];
        for raw in script {
            let edit: FieldEdit = raw.parse().expect("edit");
            let outcome = state.apply(&edit).expect("applied");
            assert!(outcome.is_applied(), "{raw} should apply");
        }
        assert_eq!(
            state.preview_json(),
            "{\n  \"name\": \"STRING\",\n  \"address\": {\n    \"city\": \"STRING\"\n  }\n}"
        );
    }

    #[test]
    fn apply_reports_unresolved_and_invalid_edits() {
        let mut state = FormState::default();
        let outcome = state
            .apply(&FieldEdit::Remove {
                path: FieldPath::from([4]),
            })
            .expect("benign");
        assert_eq!(outcome, EditOutcome::Unresolved);

        let err = state
            .apply(&FieldEdit::Retype {
                path: FieldPath::from([0]),
                kind: "array".to_string(),
            })
            .expect_err("invalid type");
        assert_eq!(err, SchemaError::InvalidType("array".to_string()));
        assert_eq!(state.revision(), 0);
    }
}
