//! Protocol error types

use thiserror::Error;

/// Errors that can occur while encoding or decoding wire frames
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Frame could not be parsed or serialized as JSON
    #[error("Malformed frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),
}
