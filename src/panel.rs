//! The public facade: spawn the link, toggle the laser, shut down.

use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

use crate::command::{send_toggle, LaserCommand};
use crate::config::Settings;
use crate::error::Result;
use crate::events::{LinkEvent, LinkState};
use crate::supervisor::{LinkShared, LinkSupervisor};

/// Handle to a running laser link.
///
/// Created by [`LaserPanel::spawn`], which also returns the observer's event
/// channel. The handle is cheap to share behind an `Arc`; all methods take
/// `&self`.
pub struct LaserPanel {
    shared: Arc<LinkShared>,
    events: mpsc::UnboundedSender<LinkEvent>,
    shutdown: watch::Sender<bool>,
    supervisor: Mutex<Option<JoinHandle<()>>>,
}

impl LaserPanel {
    /// Start the supervisor task and return the handle plus the event stream.
    ///
    /// Must be called from within a tokio runtime. The first event is always
    /// `StatusChanged(Connecting)`.
    #[must_use]
    pub fn spawn(settings: Settings) -> (Self, mpsc::UnboundedReceiver<LinkEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let shared = Arc::new(LinkShared::new());

        let supervisor = LinkSupervisor::new(
            &settings,
            Arc::clone(&shared),
            events_tx.clone(),
            shutdown_rx,
        );
        let task = tokio::spawn(supervisor.run());

        (
            Self {
                shared,
                events: events_tx,
                shutdown: shutdown_tx,
                supervisor: Mutex::new(Some(task)),
            },
            events_rx,
        )
    }

    /// Flip the laser toggle and send the matching `ON\n`/`OFF\n` command.
    ///
    /// Returns the command actually sent, so a frontend can update its button
    /// caption. Fails with [`crate::PanelError::NotConnected`] (toggle
    /// untouched) when no link is live, or [`crate::PanelError::SendFailed`]
    /// when the write fails; both are also surfaced to the observer as
    /// [`LinkEvent::CommandRejected`].
    pub async fn toggle_laser(&self) -> Result<LaserCommand> {
        send_toggle(&self.shared, &self.events).await
    }

    /// Current connection state.
    pub async fn state(&self) -> LinkState {
        self.shared.inner.lock().await.state
    }

    /// Current laser toggle state.
    pub async fn laser_on(&self) -> bool {
        self.shared.inner.lock().await.laser_on
    }

    /// Stop the supervisor, release the transport and join both tasks.
    ///
    /// Idempotent; repeated calls are no-ops.
    pub async fn shutdown(&self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.supervisor.lock().await.take() {
            let _ = task.await;
        }
    }
}
