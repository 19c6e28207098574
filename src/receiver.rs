//! The inbound read loop, one per connection generation.
//!
//! The receiver pulls raw bytes from the transport's read half and forwards
//! them as text events. It never reports failure to the supervisor directly:
//! the `Lost` transition in the shared record is the sole failure channel,
//! and the supervisor picks it up on its next tick.

use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::net::tcp::OwnedReadHalf;
use tokio::sync::{mpsc, watch};
use tracing::{trace, warn};

use crate::events::{LinkEvent, LinkState};
use crate::supervisor::LinkShared;

/// Read until EOF, error or shutdown.
///
/// Each chunk (up to `buffer_size` bytes) is decoded as UTF-8 on its own with
/// `from_utf8_lossy`: a multi-byte scalar split across two reads surfaces as
/// replacement characters. Chunks are not reassembled or line-buffered.
///
/// EOF and read errors are treated uniformly as connection loss: exactly one
/// `StatusChanged(Lost)` is emitted, the writer is released, and the loop
/// terminates. It is never restarted here; only the supervisor starts a fresh
/// receiver on a fresh transport.
pub(crate) async fn read_loop(
    mut reader: OwnedReadHalf,
    generation: u64,
    shared: Arc<LinkShared>,
    events: mpsc::UnboundedSender<LinkEvent>,
    mut shutdown: watch::Receiver<bool>,
    buffer_size: usize,
) {
    let mut buf = vec![0u8; buffer_size];

    loop {
        let result = tokio::select! {
            result = reader.read(&mut buf) => result,
            _ = shutdown.changed() => return,
        };

        match result {
            Ok(0) => {
                // Orderly remote close.
                mark_lost(generation, &shared, &events, "remote closed").await;
                return;
            }
            Ok(n) => {
                let text = String::from_utf8_lossy(&buf[..n]).into_owned();
                trace!(generation, bytes = n, "inbound text");
                let _ = events.send(LinkEvent::TextReceived(text));
            }
            Err(err) => {
                mark_lost(generation, &shared, &events, &err.to_string()).await;
                return;
            }
        }
    }
}

/// Record the loss of this generation's link and notify the observer.
///
/// Guarded by the generation counter: if the supervisor already installed a
/// newer transport, the record belongs to that generation and stays as is.
async fn mark_lost(
    generation: u64,
    shared: &LinkShared,
    events: &mpsc::UnboundedSender<LinkEvent>,
    reason: &str,
) {
    {
        let mut inner = shared.inner.lock().await;
        if inner.generation != generation || !inner.state.is_connected() {
            return;
        }
        inner.state = LinkState::Lost;
        inner.writer = None;
    }
    warn!(generation, reason, "connection lost");
    let _ = events.send(LinkEvent::StatusChanged(LinkState::Lost));
}
