//! Frame types for the stardew-link protocol
//!
//! This module defines the JSON frames exchanged with the game process.
//! Every frame is a single WebSocket text message, externally tagged on
//! its `type` field.
//!
//! # Message Flow
//!
//! Typical sequence on a connection:
//!
//! 1. Client connects to the game's WebSocket endpoint
//! 2. Client sends `command` frames, each carrying a fresh id
//! 3. Game answers each command with a `response` frame echoing the id
//!    (replies may arrive in any order; correlation is by id only)
//! 4. Game pushes `state` frames at its own pace, unrelated to any command
//! 5. Game may push `error` frames for problems not tied to a command
//! 6. Client sends `ping` frames periodically; no reply is expected

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::CommandId;

/// The latest full game state pushed by the game.
///
/// Opaque to this layer: the game overwrites it wholesale on each push and
/// the client never interprets individual fields.
pub type StateSnapshot = Value;

/// Frames sent from the client to the game
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Outbound {
    /// A remote command invocation
    Command {
        /// Correlation id, unique per invocation
        id: CommandId,
        /// Name of the remote operation
        action: String,
        /// Operation parameters, shape defined by the action
        params: Value,
    },

    /// Keep-alive probe.
    ///
    /// Carries no id and is never matched against a reply; it exists to
    /// detect silent half-open connections.
    Ping,
}

/// Frames received from the game
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Inbound {
    /// Reply to a command, matched by id
    Response {
        /// Id echoed from the originating command
        id: CommandId,
        /// Human-readable result message
        #[serde(default)]
        message: Option<String>,
        /// Structured result payload
        #[serde(default)]
        data: Option<Value>,
    },

    /// Full game state push; overwrites any previously pushed state
    State {
        /// The new snapshot
        data: StateSnapshot,
    },

    /// Error notification not tied to any pending command
    Error {
        /// Human-readable description from the game
        message: String,
    },
}

/// The successful payload of a resolved command
#[derive(Debug, Clone, PartialEq)]
pub struct CommandReply {
    /// Human-readable result message, if the game provided one
    pub message: Option<String>,
    /// Structured result payload, if the game provided one
    pub data: Option<Value>,
}
