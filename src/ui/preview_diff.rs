use similar::{DiffOp, TextDiff};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Context,
    Removed,
    Added,
}

impl LineKind {
    fn marker(self) -> char {
        match self {
            Self::Context => ' ',
            Self::Removed => '-',
            Self::Added => '+',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffRow {
    Line { kind: LineKind, text: String },
    Gap { hidden: usize },
}

/// Line diff between two preview renderings, keeping `context` unchanged
/// lines around each change.
pub fn diff_rows(old: &str, new: &str, context: usize) -> Vec<DiffRow> {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    let line = |lines: &[&str], idx: usize| lines.get(idx).copied().unwrap_or("").to_string();

    let diff = TextDiff::from_lines(old, new);
    let mut rows = Vec::new();
    let mut prev_old_end = 0usize;

    for group in diff.grouped_ops(context) {
        let group_old_start = group.first().map(|op| op.old_range().start).unwrap_or(0);
        let hidden = group_old_start.saturating_sub(prev_old_end);
        if hidden > 0 {
            rows.push(DiffRow::Gap { hidden });
        }

        for op in &group {
            match op {
                DiffOp::Equal { old_index, len, .. } => {
                    rows.extend((0..*len).map(|i| DiffRow::Line {
                        kind: LineKind::Context,
                        text: line(&old_lines, *old_index + i),
                    }));
                }
                DiffOp::Delete {
                    old_index, old_len, ..
                } => {
                    rows.extend((0..*old_len).map(|i| DiffRow::Line {
                        kind: LineKind::Removed,
                        text: line(&old_lines, *old_index + i),
                    }));
                }
                DiffOp::Insert {
                    new_index, new_len, ..
                } => {
                    rows.extend((0..*new_len).map(|i| DiffRow::Line {
                        kind: LineKind::Added,
                        text: line(&new_lines, *new_index + i),
                    }));
                }
                DiffOp::Replace {
                    old_index,
                    old_len,
                    new_index,
                    new_len,
                } => {
                    rows.extend((0..*old_len).map(|i| DiffRow::Line {
                        kind: LineKind::Removed,
                        text: line(&old_lines, *old_index + i),
                    }));
                    rows.extend((0..*new_len).map(|i| DiffRow::Line {
                        kind: LineKind::Added,
                        text: line(&new_lines, *new_index + i),
                    }));
                }
            }
        }

        prev_old_end = group.last().map(|op| op.old_range().end).unwrap_or(prev_old_end);
    }

    let trailing = old_lines.len().saturating_sub(prev_old_end);
    if !rows.is_empty() && trailing > 0 {
        rows.push(DiffRow::Gap { hidden: trailing });
    }

    rows
}

pub fn render_diff(old: &str, new: &str, context: usize) -> String {
    let mut out = String::new();
    for row in diff_rows(old, new, context) {
        match row {
            DiffRow::Line { kind, text } => {
                out.push(kind.marker());
                out.push_str(text.as_str());
            }
            DiffRow::Gap { hidden } => {
                out.push_str(format!("@@ {hidden} unchanged @@").as_str());
            }
        }
        out.push('\n');
    }
    out
}
