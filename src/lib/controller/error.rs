use crate::ftl::{ConnectionError, ProtocolError};

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("Could not reach FTL: {0}")]
    Connection(#[from] ConnectionError),

    #[error("FTL exchange failed: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Gave up after {attempts} reconnect attempts: {source}")]
    ReconnectExhausted {
        attempts: u32,
        source: ConnectionError,
    },
}

/// How a refresh loop that did not fail came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The single cycle of a run-once loop was shown.
    Completed,
    /// A stop was requested from outside.
    Stopped,
}

impl ControllerError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Connection(_) => 2,
            Self::Protocol(_) => 3,
            Self::ReconnectExhausted { .. } => 4,
        }
    }
}

pub fn exit_code(result: &Result<Termination, ControllerError>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(error) => error.exit_code(),
    }
}
