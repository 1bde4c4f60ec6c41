use std::fmt;

use serde::{Deserialize, Serialize};

/// Sibling indices from the top-level sequence down to a field.
///
/// Paths are positional, so any insertion or removal may invalidate them.
/// Resolve them against the current tree and do not keep them across edits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath {
    indices: Vec<usize>,
}

impl FieldPath {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    /// The top-level sequence.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        self.indices.as_slice()
    }

    pub fn depth(&self) -> usize {
        self.indices.len()
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.indices.clone();
        indices.push(index);
        Self { indices }
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, head) = self.indices.split_last()?;
        Some(Self::new(head.to_vec()))
    }

    pub fn last_index(&self) -> Option<usize> {
        self.indices.last().copied()
    }

    /// Accepts `1.0`, `[1][0]` and mixed forms like `1[0]`. Empty input is
    /// the root path.
    pub fn parse(input: &str) -> Result<Self, FieldPathParseError> {
        parse_path(input)
    }
}

impl From<Vec<usize>> for FieldPath {
    fn from(value: Vec<usize>) -> Self {
        Self::new(value)
    }
}

impl From<&[usize]> for FieldPath {
    fn from(value: &[usize]) -> Self {
        Self::new(value.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for FieldPath {
    fn from(value: [usize; N]) -> Self {
        Self::new(value.to_vec())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, index) in self.indices.iter().enumerate() {
            if idx > 0 {
                f.write_str(".")?;
            }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPathParseError {
    message: String,
}

impl FieldPathParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldPathParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message.as_str())
    }
}

impl std::error::Error for FieldPathParseError {}

fn parse_path(input: &str) -> Result<FieldPath, FieldPathParseError> {
    let raw = input.trim();
    if raw.is_empty() {
        return Ok(FieldPath::root());
    }

    let chars: Vec<char> = raw.chars().collect();
    let mut idx = 0usize;
    let mut out = Vec::<usize>::new();

    while idx < chars.len() {
        let ch = chars[idx];
        if ch == '.' {
            if out.is_empty() {
                return Err(FieldPathParseError::new("path cannot start with '.'"));
            }
            idx += 1;
            out.push(parse_index(&chars, &mut idx)?);
            continue;
        }

        if ch == '[' {
            idx += 1;
            let index = parse_index(&chars, &mut idx)?;
            if chars.get(idx).copied() != Some(']') {
                return Err(FieldPathParseError::new("expected closing ']'"));
            }
            idx += 1;
            out.push(index);
            continue;
        }

        if out.is_empty() {
            out.push(parse_index(&chars, &mut idx)?);
            continue;
        }

        return Err(FieldPathParseError::new(format!(
            "unexpected character '{}' at position {}",
            ch, idx
        )));
    }

    Ok(FieldPath::new(out))
}

fn parse_index(chars: &[char], idx: &mut usize) -> Result<usize, FieldPathParseError> {
    let start = *idx;
    while *idx < chars.len() && chars[*idx].is_ascii_digit() {
        *idx += 1;
    }
    if *idx == start {
        return Err(FieldPathParseError::new(format!(
            "expected index at position {}",
            start
        )));
    }
    chars[start..*idx]
        .iter()
        .collect::<String>()
        .parse::<usize>()
        .map_err(|_| FieldPathParseError::new(format!("index out of range at position {start}")))
}
