//! Parameter error taxonomy.

use thiserror::Error;

/// Errors raised while validating, parsing or resolving parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    /// Key is not registered and no wildcard category matches it.
    #[error("unknown parameter '{key}': not in the schema and no matching '<category>.*' wildcard")]
    UnknownParameter { key: String },

    /// Value has the wrong kind for its key.
    #[error("parameter '{key}' should be {expected}, but got {actual}")]
    TypeMismatch {
        key: String,
        expected: String,
        actual: &'static str,
    },

    /// Key is not of the form `category.attribute`.
    #[error("malformed parameter key '{key}': expected 'category.attribute'")]
    MalformedKey { key: String },

    /// Value has the right kind but violates a range rule.
    #[error("parameter '{key}' = {value} is out of range: expected {expected}")]
    OutOfRange {
        key: String,
        value: String,
        expected: &'static str,
    },

    /// A key required to build a parameter set is absent.
    #[error("missing required parameter '{key}'")]
    MissingParameter { key: String },

    /// Value is well-typed but not one of the accepted spellings.
    #[error("invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Result type for parameter operations.
pub type ParamResult<T> = Result<T, ParamError>;
