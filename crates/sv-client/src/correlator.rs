//! Command/reply correlation
//!
//! Maps every in-flight command id to its pending completion. Each entry
//! leaves the table in exactly one of three ways: resolved by a matching
//! reply, timed out at its deadline, or flushed when the connection drops.
//! Whichever happens first wins; the others are silent no-ops.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio_util::time::delay_queue::{DelayQueue, Key};

use sv_protocol::{CommandId, CommandReply};

use crate::error::ClientError;

/// How a pending command eventually settles
pub type CommandOutcome = Result<CommandReply, ClientError>;

/// One in-flight command awaiting its reply
struct PendingCommand {
    /// Completion slot held by the caller
    tx: oneshot::Sender<CommandOutcome>,
    /// Handle to the entry's deadline timer
    timer: Key,
    /// Deadline duration, echoed in the timeout error
    timeout: Duration,
}

/// Instance-owned correlation table, one per session
pub struct Correlator {
    pending: HashMap<CommandId, PendingCommand>,
    deadlines: DelayQueue<CommandId>,
}

impl Correlator {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
            deadlines: DelayQueue::new(),
        }
    }

    /// Number of commands currently in flight
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no commands are in flight
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Register a pending command and start its deadline clock.
    ///
    /// Ids are collision-free by construction; should an id nonetheless
    /// already be pending, the older entry is dropped (its caller sees the
    /// channel close) rather than letting two entries share one id.
    pub fn register(
        &mut self,
        id: CommandId,
        timeout: Duration,
        tx: oneshot::Sender<CommandOutcome>,
    ) {
        let timer = self.deadlines.insert(id.clone(), timeout);
        if let Some(old) = self.pending.insert(id.clone(), PendingCommand { tx, timer, timeout }) {
            self.deadlines.remove(&old.timer);
            tracing::error!(%id, "Duplicate command id registered; dropping older entry");
        }
    }

    /// Complete a pending command with a successful reply.
    ///
    /// Late, duplicate, or unknown ids are a no-op: the reply is dropped
    /// without touching any other entry.
    pub fn resolve(&mut self, id: &CommandId, reply: CommandReply) {
        match self.pending.remove(id) {
            Some(entry) => {
                self.deadlines.remove(&entry.timer);
                let _ = entry.tx.send(Ok(reply));
            }
            None => {
                tracing::debug!(%id, "Reply for unknown or already-settled command");
            }
        }
    }

    /// Wait for the next deadline to fire and fail that command with
    /// `CommandTimeout`.
    ///
    /// Pends forever while the table is empty; the session's select loop
    /// rebuilds this future whenever another branch mutates the table.
    pub async fn fire_next_timeout(&mut self) -> CommandId {
        loop {
            let expired =
                std::future::poll_fn(|cx| self.deadlines.poll_expired(cx)).await;
            match expired {
                Some(expired) => {
                    let id = expired.into_inner();
                    if let Some(entry) = self.pending.remove(&id) {
                        let timeout_ms = entry.timeout.as_millis() as u64;
                        let _ = entry.tx.send(Err(ClientError::CommandTimeout { timeout_ms }));
                        return id;
                    }
                    // Entry already settled between expiry and removal.
                }
                None => std::future::pending::<()>().await,
            }
        }
    }

    /// Fail every pending command with `ConnectionLost` and clear the table
    pub fn flush_all(&mut self, reason: &str) {
        let flushed = self.pending.len();
        for (_, entry) in self.pending.drain() {
            let _ = entry
                .tx
                .send(Err(ClientError::ConnectionLost(reason.to_string())));
        }
        self.deadlines.clear();

        if flushed > 0 {
            tracing::warn!(flushed, %reason, "Flushed pending commands");
        }
    }
}

impl Default for Correlator {
    fn default() -> Self {
        Self::new()
    }
}
