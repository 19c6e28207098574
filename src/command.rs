//! The two-state laser command and the send path.
//!
//! The wire protocol is two literal ASCII lines, `ON\n` and `OFF\n`,
//! fire-and-forget over the stream. No batching, no acknowledgment.

use std::fmt;

use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::{PanelError, Result};
use crate::events::LinkEvent;
use crate::supervisor::LinkShared;

/// One of the two commands the controller understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaserCommand {
    /// Turn the laser on.
    On,
    /// Turn the laser off.
    Off,
}

impl LaserCommand {
    /// The command corresponding to a toggle state.
    #[must_use]
    pub fn from_state(on: bool) -> Self {
        if on {
            Self::On
        } else {
            Self::Off
        }
    }

    /// The literal wire line, newline included.
    #[must_use]
    pub fn as_line(&self) -> &'static str {
        match self {
            Self::On => "ON\n",
            Self::Off => "OFF\n",
        }
    }

    /// Button caption for a frontend: what pressing the button would do next.
    #[must_use]
    pub fn button_caption(&self) -> &'static str {
        match self {
            Self::On => "STOP LASER",
            Self::Off => "START LASER",
        }
    }
}

impl fmt::Display for LaserCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_line().trim_end())
    }
}

/// Flip the toggle and send the matching command through the live writer.
///
/// With no live connection this fails with [`PanelError::NotConnected`] and
/// leaves the toggle untouched. On a live connection the toggle flips first
/// and stays flipped even if the write fails; a broken write will also break
/// the receiver's next read, which is what drives reconnection.
pub(crate) async fn send_toggle(
    shared: &LinkShared,
    events: &mpsc::UnboundedSender<LinkEvent>,
) -> Result<LaserCommand> {
    let mut inner = shared.inner.lock().await;

    let next = !inner.laser_on;
    let command = LaserCommand::from_state(next);

    // Take the writer out for the duration of the send; the lock is held the
    // whole time, so nobody observes the empty slot.
    let Some(mut writer) = inner.writer.take() else {
        drop(inner);
        warn!("toggle rejected: no connection");
        let _ = events.send(LinkEvent::CommandRejected(
            PanelError::NotConnected.to_string(),
        ));
        return Err(PanelError::NotConnected);
    };

    inner.laser_on = next;
    let outcome = match writer.write_all(command.as_line().as_bytes()).await {
        Ok(()) => writer.flush().await,
        Err(err) => Err(err),
    };
    inner.writer = Some(writer);
    drop(inner);

    match outcome {
        Ok(()) => {
            info!(%command, "command sent");
            Ok(command)
        }
        Err(err) => {
            let reason = err.to_string();
            warn!(%command, error = %reason, "command write failed");
            let _ = events.send(LinkEvent::CommandRejected(format!("send failed: {reason}")));
            Err(PanelError::SendFailed(reason))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_literals() {
        assert_eq!(LaserCommand::On.as_line(), "ON\n");
        assert_eq!(LaserCommand::Off.as_line(), "OFF\n");
    }

    #[test]
    fn from_state_pairs_with_toggle() {
        assert_eq!(LaserCommand::from_state(true), LaserCommand::On);
        assert_eq!(LaserCommand::from_state(false), LaserCommand::Off);
    }

    #[test]
    fn captions_describe_the_next_action() {
        assert_eq!(LaserCommand::On.button_caption(), "STOP LASER");
        assert_eq!(LaserCommand::Off.button_caption(), "START LASER");
    }

    #[test]
    fn display_strips_the_newline() {
        assert_eq!(LaserCommand::On.to_string(), "ON");
        assert_eq!(LaserCommand::Off.to_string(), "OFF");
    }
}
