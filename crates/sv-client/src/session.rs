//! The caller-facing session
//!
//! A [`Session`] bundles the transport, correlator, state cache, and
//! reconnect supervisor behind one handle. All of their state lives in a
//! single task (one logical thread of control, no locks): the handle talks
//! to it over an op channel, commands complete through per-command oneshot
//! slots, and lifecycle is observable through a broadcast channel. Replies
//! are matched solely by command id, never by issuance order, so callers
//! issuing commands concurrently may see completions interleave.

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use sv_protocol::{CommandId, CommandReply, Outbound, StateSnapshot};

use crate::config::SessionConfig;
use crate::correlator::{CommandOutcome, Correlator};
use crate::error::ClientError;
use crate::state::StateCache;
use crate::supervisor::ReconnectSupervisor;
use crate::transport::{ConnectionStatus, Transport};

/// Capacity of the handle-to-task op channel.
///
/// Ops are small and the task drains them quickly; 64 covers bursts of
/// concurrently issued commands without unbounded buffering.
const OP_CHANNEL_CAPACITY: usize = 64;

/// Capacity of the lifecycle event channel. Slow subscribers that fall
/// further behind than this see `Lagged` and skip ahead.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Lifecycle and game events observable by callers
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The channel to the game opened (initially or after a reconnect)
    Connected,
    /// The channel closed or errored
    Disconnected,
    /// The game pushed an error notification not tied to any command
    GameError(String),
    /// The game pushed a new state snapshot
    State(StateSnapshot),
}

/// Requests from the handle to the session task
enum Op {
    Command {
        action: String,
        params: serde_json::Value,
        reply: oneshot::Sender<CommandOutcome>,
    },
    Stop {
        ack: oneshot::Sender<()>,
    },
}

/// Handle to a running session
pub struct Session {
    op_tx: mpsc::Sender<Op>,
    state_rx: watch::Receiver<Option<StateSnapshot>>,
    status_rx: watch::Receiver<ConnectionStatus>,
    events: broadcast::Sender<SessionEvent>,
    _task: JoinHandle<()>,
}

impl Session {
    /// Open the connection and start the session.
    ///
    /// Resolves once the channel reports open; fails with
    /// [`ClientError::Connection`] otherwise. Later drops are handled
    /// transparently by the reconnect supervisor without the caller
    /// re-invoking this.
    pub async fn connect(config: SessionConfig) -> Result<Self, ClientError> {
        let transport = Transport::connect(&config.endpoint, config.connect_timeout).await?;

        let (op_tx, op_rx) = mpsc::channel(OP_CHANNEL_CAPACITY);
        let (state, state_rx) = StateCache::new();
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Connected);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let mut task = SessionTask {
            supervisor: ReconnectSupervisor::new(config.reconnect_delay),
            correlator: Correlator::new(),
            state,
            status_tx,
            events: events.clone(),
            op_rx,
            config,
        };
        // The open transition happens here, before the task is spawned: no
        // subscriber can exist yet, so the event stream only ever describes
        // transitions that occur after `subscribe`.
        task.supervisor.on_opened();
        tracing::info!(endpoint = %task.config.endpoint, "Connected to game");
        let handle = tokio::spawn(task.run(transport));

        Ok(Self {
            op_tx,
            state_rx,
            status_rx,
            events,
            _task: handle,
        })
    }

    /// Issue a command and await its reply.
    ///
    /// Fails immediately with [`ClientError::NotConnected`] while the
    /// session is disconnected or after [`Session::stop`]. Otherwise the
    /// outcome settles when the matching reply arrives, the per-command
    /// deadline elapses, or the connection drops.
    pub async fn send_command(
        &self,
        action: impl Into<String>,
        params: serde_json::Value,
    ) -> Result<CommandReply, ClientError> {
        let (tx, rx) = oneshot::channel();
        self.op_tx
            .send(Op::Command {
                action: action.into(),
                params,
                reply: tx,
            })
            .await
            .map_err(|_| ClientError::NotConnected)?;

        rx.await
            .map_err(|_| ClientError::ConnectionLost("session terminated".to_string()))?
    }

    /// The most recently pushed game state, or `None` before the first push
    pub fn latest_state(&self) -> Option<StateSnapshot> {
        self.state_rx.borrow().clone()
    }

    /// Current connection status
    pub fn status(&self) -> ConnectionStatus {
        *self.status_rx.borrow()
    }

    /// Whether the channel to the game is currently open
    pub fn is_connected(&self) -> bool {
        self.status() == ConnectionStatus::Connected
    }

    /// Subscribe to lifecycle and game events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Stop the session: flush pending commands, close the channel, and
    /// suppress any further reconnection.
    ///
    /// Returns once teardown is complete, so a subsequent
    /// [`Session::send_command`] fails immediately with `NotConnected`.
    pub async fn stop(&self) {
        let (tx, rx) = oneshot::channel();
        if self.op_tx.send(Op::Stop { ack: tx }).await.is_ok() {
            let _ = rx.await;
        }
    }
}

/// Why the connected loop ended
enum Exit {
    /// The channel closed or a write failed
    Lost(String),
    /// A stop was requested (`ack` is `None` when every handle was dropped)
    Stopped { ack: Option<oneshot::Sender<()>> },
}

/// The task owning all mutable session state
struct SessionTask {
    config: SessionConfig,
    op_rx: mpsc::Receiver<Op>,
    correlator: Correlator,
    state: StateCache,
    supervisor: ReconnectSupervisor,
    status_tx: watch::Sender<ConnectionStatus>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionTask {
    async fn run(mut self, mut transport: Transport) {
        loop {
            let exit = self.serve_connected(&mut transport).await;
            transport.close().await;
            self.status_tx.send_replace(ConnectionStatus::Disconnected);

            match exit {
                Exit::Stopped { ack } => {
                    self.supervisor.begin_stop();
                    self.correlator.flush_all("session stopped");
                    self.emit(SessionEvent::Disconnected);
                    self.supervisor.confirm_stopped();
                    if let Some(ack) = ack {
                        let _ = ack.send(());
                    }
                    tracing::info!("Session stopped");
                    return;
                }
                Exit::Lost(reason) => {
                    tracing::warn!(%reason, "Connection to game lost");
                    self.correlator.flush_all(&reason);
                    self.emit(SessionEvent::Disconnected);

                    let Some(delay) = self.supervisor.on_connection_lost() else {
                        return;
                    };
                    match self.reconnect(delay).await {
                        Some(next) => {
                            transport = next;
                            self.supervisor.on_opened();
                            self.status_tx.send_replace(ConnectionStatus::Connected);
                            self.emit(SessionEvent::Connected);
                            tracing::info!(
                                endpoint = %self.config.endpoint,
                                "Reconnected to game"
                            );
                        }
                        None => return,
                    }
                }
            }
        }
    }

    /// Serve ops and inbound traffic until the connection drops or a stop
    /// arrives.
    async fn serve_connected(&mut self, transport: &mut Transport) -> Exit {
        let keepalive_interval = self.config.keepalive_interval;
        let mut keepalive =
            time::interval_at(Instant::now() + keepalive_interval, keepalive_interval);

        loop {
            tokio::select! {
                op = self.op_rx.recv() => match op {
                    Some(Op::Command { action, params, reply }) => {
                        let id = CommandId::generate();
                        let frame = Outbound::Command {
                            id: id.clone(),
                            action,
                            params,
                        };
                        match transport.send(&frame).await {
                            Ok(()) => {
                                self.correlator.register(
                                    id,
                                    self.config.command_timeout,
                                    reply,
                                );
                            }
                            Err(ClientError::Protocol(e)) => {
                                let _ = reply.send(Err(ClientError::Protocol(e)));
                            }
                            Err(e) => {
                                let reason = e.to_string();
                                let _ = reply
                                    .send(Err(ClientError::ConnectionLost(reason.clone())));
                                return Exit::Lost(reason);
                            }
                        }
                    }
                    Some(Op::Stop { ack }) => return Exit::Stopped { ack: Some(ack) },
                    None => return Exit::Stopped { ack: None },
                },

                payload = transport.recv() => match payload {
                    Some(text) => self.route_inbound(&text),
                    None => return Exit::Lost("channel closed".to_string()),
                },

                id = self.correlator.fire_next_timeout() => {
                    tracing::warn!(%id, "Command timed out");
                }

                _ = keepalive.tick() => {
                    if let Err(e) = transport.send(&Outbound::Ping).await {
                        return Exit::Lost(e.to_string());
                    }
                }
            }
        }
    }

    /// Route one inbound frame: replies to the correlator, state pushes to
    /// the cache, error notifications to subscribers. Malformed frames are
    /// dropped with a diagnostic and settle nothing.
    fn route_inbound(&mut self, text: &str) {
        match sv_protocol::decode(text) {
            Ok(sv_protocol::Inbound::Response { id, message, data }) => {
                self.correlator.resolve(&id, CommandReply { message, data });
            }
            Ok(sv_protocol::Inbound::State { data }) => {
                self.state.update(data.clone());
                self.emit(SessionEvent::State(data));
            }
            Ok(sv_protocol::Inbound::Error { message }) => {
                tracing::warn!(%message, "Game reported an error");
                self.emit(SessionEvent::GameError(message));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed frame");
            }
        }
    }

    /// Wait out the fixed delay and try to connect again, repeating until
    /// a connection succeeds or the session is stopped. Ops arriving while
    /// disconnected are failed immediately with `NotConnected`.
    async fn reconnect(&mut self, delay: std::time::Duration) -> Option<Transport> {
        loop {
            tracing::info!(delay_ms = delay.as_millis() as u64, "Scheduling reconnect");
            let sleep = time::sleep(delay);
            tokio::pin!(sleep);

            loop {
                tokio::select! {
                    op = self.op_rx.recv() => match op {
                        Some(Op::Command { reply, .. }) => {
                            let _ = reply.send(Err(ClientError::NotConnected));
                        }
                        Some(Op::Stop { ack }) => {
                            self.finish_stop(Some(ack));
                            return None;
                        }
                        None => {
                            self.finish_stop(None);
                            return None;
                        }
                    },
                    () = &mut sleep => break,
                }
            }

            self.status_tx.send_replace(ConnectionStatus::Connecting);
            // Keep serving ops while the attempt is in flight: commands must
            // fail promptly with NotConnected and a stop must abort the
            // attempt rather than wait out its timeout.
            let endpoint = self.config.endpoint.clone();
            let attempt = Transport::connect(&endpoint, self.config.connect_timeout);
            tokio::pin!(attempt);

            loop {
                tokio::select! {
                    op = self.op_rx.recv() => match op {
                        Some(Op::Command { reply, .. }) => {
                            let _ = reply.send(Err(ClientError::NotConnected));
                        }
                        Some(Op::Stop { ack }) => {
                            self.finish_stop(Some(ack));
                            return None;
                        }
                        None => {
                            self.finish_stop(None);
                            return None;
                        }
                    },
                    result = &mut attempt => {
                        match result {
                            Ok(transport) => return Some(transport),
                            Err(e) => {
                                tracing::warn!(error = %e, "Reconnect attempt failed");
                                self.status_tx.send_replace(ConnectionStatus::Disconnected);
                                break;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Teardown for a stop that arrives while disconnected
    fn finish_stop(&mut self, ack: Option<oneshot::Sender<()>>) {
        self.supervisor.begin_stop();
        self.supervisor.confirm_stopped();
        self.status_tx.send_replace(ConnectionStatus::Disconnected);
        if let Some(ack) = ack {
            let _ = ack.send(());
        }
        tracing::info!("Session stopped");
    }

    fn emit(&self, event: SessionEvent) {
        // Err just means no subscriber is listening right now.
        let _ = self.events.send(event);
    }
}
