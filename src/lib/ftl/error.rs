use std::time::Duration;

use super::client::Command;

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("Failed to resolve {address}: {source}")]
    Resolve {
        address: String,
        source: std::io::Error,
    },

    #[error("No socket address found for {0}")]
    NoAddress(String),

    #[error("Failed to connect to {address}: {source}")]
    Connect {
        address: String,
        source: std::io::Error,
    },

    #[error("Failed to configure the socket to {address}: {source}")]
    Configure {
        address: String,
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("No open connection")]
    NotConnected,

    #[error("Failed to send {command}: {source}")]
    Send {
        command: Command,
        source: std::io::Error,
    },

    #[error("Failed reading the response: {0}")]
    Io(#[from] std::io::Error),

    #[error("No end-of-message marker after {0:?}")]
    Timeout(Duration),

    #[error("Connection closed before the end-of-message marker, {received} bytes received")]
    Closed { received: usize },

    #[error("Response grew past {limit} bytes without an end-of-message marker")]
    ResponseTooLarge { limit: usize },

    #[error("Response is not valid text: {0}")]
    Malformed(#[from] std::str::Utf8Error),
}

impl ProtocolError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
