//! sv-client: Session core for the stardew-link game connection
//!
//! Maintains one persistent WebSocket to the game process and multiplexes
//! concurrently issued commands over it. Each command is matched to its
//! reply by id, times out individually, and is failed (never retried) if
//! the connection drops while it is in flight. Pushed game state is cached
//! and readable at any time; reconnection after a drop is automatic until
//! [`Session::stop`] is called.
//!
//! ```no_run
//! use sv_client::{Session, SessionConfig};
//!
//! # async fn run() -> Result<(), sv_client::ClientError> {
//! let session = Session::connect(SessionConfig::default()).await?;
//! let reply = session
//!     .send_command("move_to", serde_json::json!({ "x": 5, "y": 10 }))
//!     .await?;
//! println!("{:?}", reply.message);
//! session.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod correlator;
pub mod error;
pub mod session;
pub mod state;
pub mod supervisor;
pub mod transport;

pub use config::SessionConfig;
pub use error::{ClientError, ConfigError};
pub use session::{Session, SessionEvent};
pub use transport::ConnectionStatus;

pub use sv_protocol::{CommandReply, StateSnapshot};
