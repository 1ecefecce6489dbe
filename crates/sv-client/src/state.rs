//! Cached game state
//!
//! The game pushes full state snapshots at its own pace, unrelated to any
//! command. Only the most recent one is kept: each push overwrites the
//! previous wholesale, with no merging, versioning, or history.

use tokio::sync::watch;

use sv_protocol::StateSnapshot;

/// Writer half of the state slot, owned by the session task
pub struct StateCache {
    tx: watch::Sender<Option<StateSnapshot>>,
}

impl StateCache {
    /// Create an empty cache and the read handle callers use.
    ///
    /// Reads through the handle never block and never fail; they return
    /// `None` until the first push.
    pub fn new() -> (Self, watch::Receiver<Option<StateSnapshot>>) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, rx)
    }

    /// Overwrite the cached snapshot
    pub fn update(&self, snapshot: StateSnapshot) {
        // send_replace never fails even with no receivers left.
        self.tx.send_replace(Some(snapshot));
    }
}
