//! Error types for the shared codecs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Malformed chain id: expected 9 bytes, got {got}")]
    MalformedChainId { got: usize },

    #[error("Invalid address: {reason}")]
    InvalidAddress { reason: String },

    #[error("Invalid message: {reason}")]
    InvalidMessage { reason: String },
}
