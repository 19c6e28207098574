//! The raw socket to the laser controller.
//!
//! A [`Transport`] wraps one live [`TcpStream`]. At most one instance exists
//! at a time; the supervisor creates one per successful connect attempt and
//! the halves are destroyed on any read/write failure or on shutdown.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::config::Endpoint;
use crate::error::{PanelError, Result};

/// One live connection to the controller.
#[derive(Debug)]
pub struct Transport {
    stream: TcpStream,
    peer: SocketAddr,
}

impl Transport {
    /// Open a connection to `endpoint`, bounded by `connect_timeout`.
    ///
    /// Nagle's algorithm is disabled; the toggle commands are tiny and
    /// latency-sensitive.
    pub async fn connect(endpoint: &Endpoint, connect_timeout: Duration) -> Result<Self> {
        let addr = endpoint.to_string();

        let stream = timeout(connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| PanelError::ConnectFailed {
                endpoint: addr.clone(),
                reason: format!("timed out after {connect_timeout:?}"),
            })?
            .map_err(|err| PanelError::ConnectFailed {
                endpoint: addr.clone(),
                reason: err.to_string(),
            })?;

        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;
        debug!(%peer, "transport opened");

        Ok(Self { stream, peer })
    }

    /// Address of the connected peer.
    #[must_use]
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Split into the read half (moved into the receiver task) and the write
    /// half (installed in the shared link record for the command sender).
    ///
    /// Dropping both halves closes the socket; dropping the write half alone
    /// shuts down the outbound direction, which is what unblocks a remote
    /// reader on shutdown.
    #[must_use]
    pub fn into_split(self) -> (OwnedReadHalf, OwnedWriteHalf) {
        self.stream.into_split()
    }
}
