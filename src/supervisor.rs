//! The connection supervisor: reconnect loop and shared link record.
//!
//! The supervisor guarantees that a live [`Transport`] exists whenever
//! possible, without ever allowing two concurrent transports or two
//! concurrent receivers. It owns the shared link record; the receiver and
//! the command sender only touch the record under its mutex.
//!
//! # State machine
//!
//! ```text
//! Disconnected ──spawn()──> Connecting
//!                               │
//!                         connect success
//!                               ▼
//!                           Connected ──read failure──> Lost
//!                               ▲                         │
//!                               │            next tick, connect success
//!                               └─────────────────────────┘
//! ```
//!
//! A connect failure while `Lost` emits one "waiting" notification
//! (`StatusChanged(Connecting)`) and then stays silent until the link comes
//! back; failures before the first success are silent apart from the initial
//! `Connecting` emitted at startup.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{Endpoint, Settings};
use crate::events::{LinkEvent, LinkState};
use crate::receiver::read_loop;
use crate::transport::Transport;

/// Mutable link record shared between supervisor, receiver and sender.
///
/// One synchronized struct holds the write half, the connection state and the
/// laser flag, so the three can never disagree.
pub(crate) struct LinkInner {
    /// Write half of the live transport; `Some` iff `state` is `Connected`.
    pub(crate) writer: Option<OwnedWriteHalf>,
    /// Current connection state.
    pub(crate) state: LinkState,
    /// Laser toggle state; default off, flips only on an accepted toggle.
    pub(crate) laser_on: bool,
    /// Bumped on every successful connect. Receivers carry their generation
    /// and leave the record alone if a newer link already took over.
    pub(crate) generation: u64,
}

/// Shared handle around [`LinkInner`].
pub(crate) struct LinkShared {
    pub(crate) inner: Mutex<LinkInner>,
}

impl LinkShared {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(LinkInner {
                writer: None,
                state: LinkState::Disconnected,
                laser_on: false,
                generation: 0,
            }),
        }
    }
}

/// The reconnect state machine, run as a dedicated task.
pub(crate) struct LinkSupervisor {
    shared: Arc<LinkShared>,
    events: mpsc::UnboundedSender<LinkEvent>,
    shutdown: watch::Receiver<bool>,
    endpoint: Endpoint,
    connect_timeout: Duration,
    poll_interval: Duration,
    buffer_size: usize,
    /// Join handle of the live receiver task, if any.
    rx_task: Option<JoinHandle<()>>,
    /// Set after the first successful connect; cleared when the single
    /// "waiting for server" notification has been emitted.
    was_connected: bool,
}

impl LinkSupervisor {
    pub(crate) fn new(
        settings: &Settings,
        shared: Arc<LinkShared>,
        events: mpsc::UnboundedSender<LinkEvent>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            shared,
            events,
            shutdown,
            endpoint: settings.connection.endpoint(),
            connect_timeout: settings.connection.connect_timeout,
            poll_interval: settings.connection.poll_interval,
            buffer_size: settings.receive.buffer_size,
            rx_task: None,
            was_connected: false,
        }
    }

    /// Loop until shutdown: ensure a live transport exists, then sleep one
    /// poll interval. The sleep races the shutdown watch, so cancellation
    /// never waits for a full tick.
    pub(crate) async fn run(mut self) {
        {
            let mut inner = self.shared.inner.lock().await;
            inner.state = LinkState::Connecting;
        }
        info!(endpoint = %self.endpoint, "link supervisor started");
        self.emit(LinkEvent::StatusChanged(LinkState::Connecting));

        loop {
            if *self.shutdown.borrow() {
                break;
            }

            let connected = self.shared.inner.lock().await.state.is_connected();
            if !connected {
                // The previous receiver (if any) has terminated or is about
                // to; join it so two receivers never overlap.
                if let Some(task) = self.rx_task.take() {
                    let _ = task.await;
                }
                self.try_connect().await;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = self.shutdown.changed() => break,
            }
        }

        self.teardown().await;
    }

    /// One connect attempt. Success installs the new transport, spawns the
    /// receiver for the new generation and emits `Connected`. Failure is
    /// silent except for the single waiting notification after a lost link.
    async fn try_connect(&mut self) {
        match Transport::connect(&self.endpoint, self.connect_timeout).await {
            Ok(transport) => {
                let peer = transport.peer();
                let (read_half, write_half) = transport.into_split();

                let generation = {
                    let mut inner = self.shared.inner.lock().await;
                    inner.generation += 1;
                    inner.writer = Some(write_half);
                    inner.state = LinkState::Connected;
                    inner.generation
                };
                self.was_connected = true;

                info!(%peer, generation, "connected");
                self.emit(LinkEvent::StatusChanged(LinkState::Connected));

                self.rx_task = Some(tokio::spawn(read_loop(
                    read_half,
                    generation,
                    Arc::clone(&self.shared),
                    self.events.clone(),
                    self.shutdown.clone(),
                    self.buffer_size,
                )));
            }
            Err(err) => {
                debug!(endpoint = %self.endpoint, error = %err, "connect attempt failed");
                if self.was_connected {
                    self.was_connected = false;
                    {
                        let mut inner = self.shared.inner.lock().await;
                        inner.state = LinkState::Connecting;
                    }
                    warn!(endpoint = %self.endpoint, "waiting for server");
                    self.emit(LinkEvent::StatusChanged(LinkState::Connecting));
                }
            }
        }
    }

    /// Release the transport and join the receiver.
    async fn teardown(&mut self) {
        {
            let mut inner = self.shared.inner.lock().await;
            inner.writer = None;
            inner.state = LinkState::Disconnected;
        }
        if let Some(task) = self.rx_task.take() {
            let _ = task.await;
        }
        info!("link supervisor stopped");
    }

    fn emit(&self, event: LinkEvent) {
        // The observer may have gone away; that is not our problem.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_record_is_disconnected_and_off() {
        let shared = LinkShared::new();
        let inner = shared.inner.lock().await;
        assert_eq!(inner.state, LinkState::Disconnected);
        assert!(!inner.laser_on);
        assert!(inner.writer.is_none());
        assert_eq!(inner.generation, 0);
    }
}
