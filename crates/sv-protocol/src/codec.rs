//! JSON codec for wire frames
//!
//! The WebSocket layer already provides message boundaries, so frames are
//! plain JSON text with no additional length framing.

use crate::error::ProtocolError;
use crate::message::{Inbound, Outbound};

/// Encode an outbound frame as JSON text
pub fn encode(frame: &Outbound) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(frame)?)
}

/// Decode one inbound frame from JSON text.
///
/// Frames with an unknown `type` tag or an invalid shape fail here; the
/// caller is expected to drop them with a diagnostic rather than let them
/// affect any pending command.
pub fn decode(text: &str) -> Result<Inbound, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}
