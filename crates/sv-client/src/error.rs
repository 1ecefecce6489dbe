//! Client error types

use std::path::PathBuf;
use sv_protocol::ProtocolError;
use thiserror::Error;

/// Errors surfaced to callers of the session
#[derive(Error, Debug)]
pub enum ClientError {
    /// Opening the connection failed
    #[error("Connection failed: {0}")]
    Connection(String),

    /// A command was attempted while not connected to the game
    #[error("Not connected to game")]
    NotConnected,

    /// No reply arrived within the command deadline
    #[error("Command timed out after {timeout_ms} ms")]
    CommandTimeout {
        /// The deadline that elapsed
        timeout_ms: u64,
    },

    /// The connection dropped while the command was in flight
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// A frame could not be encoded
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
