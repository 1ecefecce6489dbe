//! sv-protocol: Wire protocol for the stardew-link game connection
//!
//! This crate defines the JSON frames exchanged with the game process over
//! its WebSocket endpoint, and the command id scheme used to correlate
//! replies with in-flight commands.

pub mod codec;
pub mod error;
pub mod id;
pub mod message;

pub use codec::{decode, encode};
pub use error::ProtocolError;
pub use id::CommandId;
pub use message::{CommandReply, Inbound, Outbound, StateSnapshot};
