use unicode_width::UnicodeWidthStr;

use crate::core::field::{FieldKind, FieldNode};
use crate::core::field_path::FieldPath;

const EMPTY_KEY: &str = "(empty)";
const KEY_REQUIRED: &str = "! key is required";

/// One editable row of the field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineRow {
    pub path: FieldPath,
    pub key: String,
    pub kind: FieldKind,
}

impl OutlineRow {
    pub fn depth(&self) -> usize {
        self.path.depth().saturating_sub(1)
    }

    /// Empty keys are accepted by the form but flagged to the user.
    pub fn key_missing(&self) -> bool {
        self.key.is_empty()
    }

    fn label(&self) -> String {
        let key = if self.key_missing() {
            EMPTY_KEY
        } else {
            self.key.as_str()
        };
        format!("{}{}", "  ".repeat(self.depth()), key)
    }
}

pub fn outline_rows(fields: &[FieldNode]) -> Vec<OutlineRow> {
    let mut rows = Vec::new();
    collect_rows(fields, &FieldPath::root(), &mut rows);
    rows
}

fn collect_rows(fields: &[FieldNode], prefix: &FieldPath, out: &mut Vec<OutlineRow>) {
    for (idx, field) in fields.iter().enumerate() {
        let path = prefix.child(idx);
        out.push(OutlineRow {
            path: path.clone(),
            key: field.key.clone(),
            kind: field.kind,
        });
        collect_rows(field.children(), &path, out);
    }
}

/// Column-aligned text outline: path, indented key, type and a hint for
/// missing keys.
pub fn render_outline(fields: &[FieldNode]) -> String {
    let rows = outline_rows(fields);
    let paths: Vec<String> = rows.iter().map(|row| row.path.to_string()).collect();
    let labels: Vec<String> = rows.iter().map(OutlineRow::label).collect();
    let path_width = paths.iter().map(|p| p.width()).max().unwrap_or(0);
    let label_width = labels.iter().map(|l| l.width()).max().unwrap_or(0);

    let mut out = String::new();
    for ((row, path), label) in rows.iter().zip(&paths).zip(&labels) {
        out.push_str(path);
        out.push_str(" ".repeat(path_width - path.width() + 2).as_str());
        out.push_str(label);
        out.push_str(" ".repeat(label_width - label.width() + 2).as_str());
        out.push_str(row.kind.as_str());
        if row.key_missing() {
            out.push_str("  ");
            out.push_str(KEY_REQUIRED);
        }
        out.push('\n');
    }
    out
}
