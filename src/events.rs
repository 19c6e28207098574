//! Observer-facing link states and events.
//!
//! All cross-task notifications travel over an unbounded
//! [`tokio::sync::mpsc`] channel of [`LinkEvent`]s. The observer (a GUI, a
//! terminal frontend, a test harness) consumes the receiving end on its own
//! execution context; neither the supervisor nor the receiver ever touches
//! observer-owned state directly.

use std::fmt;

/// Connection state of the link to the laser controller.
///
/// Exactly one value holds at any time. Transitions happen only inside the
/// supervisor's shared record: the supervisor performs the
/// Connecting/Connected transitions, the receiver performs the Lost
/// transition for its own generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Not connected and not trying (before spawn, after shutdown).
    Disconnected,
    /// Trying to reach the controller; also the "waiting for server" state
    /// after a lost link.
    Connecting,
    /// Link is up; commands are accepted.
    Connected,
    /// The live link just dropped; a reconnect attempt is due next tick.
    Lost,
}

impl LinkState {
    /// Returns true if commands can currently be sent.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Short status label for display.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected",
            Self::Lost => "Connection lost",
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Events delivered to the observer.
///
/// Events for a given connection generation arrive in the order they were
/// produced; a `StatusChanged(Lost)` for generation N is always delivered
/// before the `StatusChanged(Connected)` of generation N+1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// The connection state changed. Emitted states are `Connecting`,
    /// `Connected` and `Lost`; the initial `Connecting` is emitted exactly
    /// once at startup, and at most once more per Connected→Lost transition.
    StatusChanged(LinkState),
    /// A chunk of inbound text, exactly as received (no line buffering).
    TextReceived(String),
    /// A toggle request was rejected or its write failed.
    CommandRejected(String),
}
