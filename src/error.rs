//! Error types

use thiserror::Error;

use crate::sim::TrialPhase;

/// Dot field could not be laid out
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Minimum separation could not be honoured within the attempt budget
    #[error("placed {placed} of {requested} dots before exhausting {attempts} attempts")]
    Infeasible {
        requested: usize,
        placed: usize,
        attempts: u32,
    },
}

/// Trial state machine errors
#[derive(Debug, Error)]
pub enum TrialError {
    #[error("participant identifier must not be empty")]
    InvalidParticipant,

    #[error("no session is running")]
    NoActiveSession,

    #[error("expected phase {expected:?}, machine is in {actual:?}")]
    WrongPhase {
        expected: TrialPhase,
        actual: TrialPhase,
    },

    #[error("dot layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Configuration loading/validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Protocol table errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("protocol must contain at least one sub-trial")]
    Empty,

    #[error("sub-trial {index} requires zero targets")]
    ZeroCount { index: usize },

    #[error("sub-trial {index} requires {count} targets but only {dots} dots are shown")]
    TooManyTargets {
        index: usize,
        count: usize,
        dots: usize,
    },
}
