use thiserror::Error;

use crate::core::FieldId;
use crate::core::field_path::FieldPathParseError;

/// Contract violations rejected at the mutation boundary. Nothing is applied
/// when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unknown field type '{0}', expected one of: string, number, nested")]
    InvalidType(String),
    #[error("duplicate field id '{0}' in initial data")]
    DuplicateId(FieldId),
    #[error("malformed edit '{0}'")]
    InvalidEdit(String),
    #[error("invalid field path: {0}")]
    InvalidPath(#[from] FieldPathParseError),
}
