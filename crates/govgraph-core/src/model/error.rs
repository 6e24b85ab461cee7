//! Model error types.

use thiserror::Error;

use super::field::FieldKind;

/// Errors raised while building, validating or serializing nodes.
///
/// All of these happen before any storage I/O.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// Assignment to a field the node type does not declare.
    #[error("{type_name} has no field '{field}'")]
    UnknownField { type_name: String, field: String },

    /// Appending to a single-valued field.
    #[error("field '{field}' is not multi-valued")]
    NotMultiValued { field: String },

    /// A raw value of the wrong kind for its field.
    #[error("field '{field}' expects {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: FieldKind,
        found: &'static str,
    },

    /// None of the accepted date/time forms matched.
    #[error("field '{field}': cannot parse date '{input}'")]
    UnparsableDate { field: String, input: String },

    /// Text that is not an absolute URI.
    #[error("field '{field}': invalid URL '{input}'")]
    InvalidUrl { field: String, input: String },

    /// A required field is missing.
    #[error("{type_name} is missing required field '{field}'")]
    Validation { type_name: String, field: String },
}
