//! Error types for projects-core.

use crate::field::FieldDataType;
use thiserror::Error;

/// Result type alias for projects-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while parsing user input or resolving field values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A requested custom field does not exist on the board.
    #[error("field {0:?} not defined")]
    FieldNotDefined(String),

    /// A value could not be parsed for the field's data type.
    #[error("invalid {expected} for field {name:?}: {value}")]
    InvalidFieldValue {
        name: String,
        value: String,
        expected: FieldDataType,
    },

    /// A value matched none of the field's options or iterations.
    #[error("option {value:?} not found for field {name:?}")]
    UnresolvedOption { name: String, value: String },

    /// A board, issue, or pull request number could not be parsed.
    #[error("invalid {kind} number: {input}")]
    InvalidNumber { kind: &'static str, input: String },

    /// A repository reference was not in `[HOST/]OWNER/REPO` form.
    #[error("expected the \"[HOST/]OWNER/REPO\" format, got {0:?}")]
    InvalidRepository(String),

    /// A field assignment was not in `name=value` form.
    #[error("expected 'name=value', got '{0}'")]
    InvalidAssignment(String),
}
