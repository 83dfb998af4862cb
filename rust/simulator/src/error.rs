//! Simulator error types.

use thiserror::Error;
use wiscs_types::{Modality, ParamError};

/// Errors raised by generation, orchestration and scenario loading.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Parameter validation or resolution failed.
    #[error(transparent)]
    Param(#[from] ParamError),

    /// A task vector does not have one entry per question.
    #[error("{modality} task has {actual} entries but n.question is {expected}")]
    DimensionMismatch {
        modality: Modality,
        expected: usize,
        actual: usize,
    },

    /// Inconsistent request or configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Operation called in the wrong generator state.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// Scenario file could not be read or parsed.
    #[error("scenario error: {0}")]
    Scenario(String),
}

/// Result type for simulator operations.
pub type SimResult<T> = Result<T, SimError>;
