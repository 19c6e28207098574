//! # laser-panel
//!
//! Client library for a laser controller reachable over a single TCP
//! endpoint. It keeps the link alive (checking once per poll interval and
//! reconnecting after drops), surfaces inbound text, and sends the two-state
//! `ON\n`/`OFF\n` toggle command on request. The presentation layer is
//! deliberately external: it consumes [`LinkEvent`]s from a channel and calls
//! methods on the [`LaserPanel`] handle (the `laser-panel` binary is one such
//! frontend).
//!
//! ## Crate structure
//!
//! - **`config`**: figment-based [`Settings`] (TOML file + `LASER_PANEL_`
//!   environment variables) defaulting to a local controller.
//! - **`transport`**: the raw socket; bounded-timeout connect and the
//!   read/write split.
//! - **`supervisor`**: the reconnection state machine and the shared link
//!   record (writer slot, [`LinkState`], toggle flag, generation counter).
//! - **`receiver`**: the per-generation read loop feeding `TextReceived`
//!   events and recording link loss.
//! - **`command`**: the [`LaserCommand`] literals and the toggle send path.
//! - **`events`**: [`LinkState`] and the observer-facing [`LinkEvent`]s.
//! - **`panel`**: the [`LaserPanel`] spawn/handle facade.
//! - **`error`**: the [`PanelError`] enum for centralized error handling.
//! - **`logging`**: tracing subscriber setup for the binary.
//!
//! ## Example
//!
//! ```no_run
//! use laser_panel::{LaserPanel, LinkEvent, Settings};
//!
//! # async fn run() -> Result<(), laser_panel::PanelError> {
//! let settings = Settings::load()?;
//! let (panel, mut events) = LaserPanel::spawn(settings);
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         LinkEvent::StatusChanged(state) => println!("[{state}]"),
//!         LinkEvent::TextReceived(text) => print!("{text}"),
//!         LinkEvent::CommandRejected(reason) => eprintln!("{reason}"),
//!     }
//! }
//! panel.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod panel;
pub mod transport;

mod receiver;
mod supervisor;

pub use command::LaserCommand;
pub use config::{ConnectionConfig, Endpoint, Settings};
pub use error::{PanelError, Result};
pub use events::{LinkEvent, LinkState};
pub use panel::LaserPanel;
pub use transport::Transport;
