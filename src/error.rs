//! Custom error types for the crate.
//!
//! `PanelError` consolidates every failure the link can surface. The split
//! mirrors how each error is handled:
//!
//! - **`Config` / `Validation`**: configuration could not be loaded or is
//!   semantically invalid. Fatal at startup, never seen afterwards.
//! - **`ConnectFailed`**: a single connect attempt failed. Always recovered;
//!   the supervisor retries on its next tick.
//! - **`NotConnected`**: a toggle was requested with no live link. Surfaced
//!   to the observer as a rejection; the toggle state is not touched.
//! - **`SendFailed`**: the command write itself failed. Surfaced to the
//!   observer; connection health is re-evaluated by the receiver's own
//!   failure detection, not by this error.
//! - **`Io`**: everything else from the socket layer.

use thiserror::Error;

/// Convenience alias for results using the crate error type.
pub type Result<T> = std::result::Result<T, PanelError>;

/// Errors produced by the laser link.
#[derive(Error, Debug)]
pub enum PanelError {
    /// Configuration failed to load or parse.
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    /// Configuration parsed but holds an invalid value.
    #[error("configuration validation error: {0}")]
    Validation(String),

    /// I/O error from the socket layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A connect attempt to the controller failed.
    #[error("connect to {endpoint} failed: {reason}")]
    ConnectFailed {
        /// The `host:port` the attempt targeted.
        endpoint: String,
        /// What went wrong, as reported by the OS or the timeout.
        reason: String,
    },

    /// A command was issued while no connection is live.
    #[error("no connection to the laser controller")]
    NotConnected,

    /// A command write failed on a live connection.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// The tracing subscriber could not be installed.
    #[error("logging init failed: {0}")]
    Logging(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_connected_message_is_user_facing() {
        assert_eq!(
            PanelError::NotConnected.to_string(),
            "no connection to the laser controller"
        );
    }

    #[test]
    fn connect_failed_names_the_endpoint() {
        let err = PanelError::ConnectFailed {
            endpoint: "127.0.0.1:12345".into(),
            reason: "connection refused".into(),
        };
        let text = err.to_string();
        assert!(text.contains("127.0.0.1:12345"));
        assert!(text.contains("connection refused"));
    }
}
