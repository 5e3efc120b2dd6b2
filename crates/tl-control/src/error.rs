use thiserror::Error;

use crate::AlgorithmKind;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    #[error("unknown algorithm type: {0:?}")]
    UnknownAlgorithm(String),

    #[error("invalid {algorithm} config: {reason}")]
    InvalidConfig { algorithm: AlgorithmKind, reason: String },

    #[error("{algorithm} parameter {name} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        algorithm: AlgorithmKind,
        name:      &'static str,
        value:     f64,
        min:       f64,
        max:       f64,
    },
}

impl ControlError {
    pub(crate) fn invalid(algorithm: AlgorithmKind, reason: impl Into<String>) -> Self {
        ControlError::InvalidConfig { algorithm, reason: reason.into() }
    }
}

pub type ControlResult<T> = Result<T, ControlError>;
