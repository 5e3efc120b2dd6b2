use thiserror::Error;
use tl_control::ControlError;

use crate::SimulationId;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation {0} not found")]
    NotFound(SimulationId),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Control(#[from] ControlError),

    #[error("simulation {0} is unusable: a previous call panicked while holding it")]
    LockPoisoned(SimulationId),
}

/// Coarse classification for callers that map errors onto transport codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    Internal,
}

impl SimError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SimError::NotFound(_)        => ErrorKind::NotFound,
            SimError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            SimError::Control(_)         => ErrorKind::InvalidArgument,
            SimError::LockPoisoned(_)    => ErrorKind::Internal,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SimError::InvalidArgument(msg.into())
    }
}

pub type SimResult<T> = Result<T, SimError>;
