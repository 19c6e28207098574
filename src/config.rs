//! Configuration loading for the laser panel.
//!
//! Settings are loaded from an optional TOML file merged with environment
//! variables prefixed `LASER_PANEL_` (double underscore separates sections,
//! e.g. `LASER_PANEL_CONNECTION__PORT=12346`).
//!
//! Defaults target a local controller: `127.0.0.1:12345`, one connect check
//! per second, 256-byte read buffer.
//!
//! # Example
//! ```no_run
//! use laser_panel::Settings;
//!
//! # fn main() -> Result<(), laser_panel::PanelError> {
//! let settings = Settings::load()?;
//! println!("endpoint: {}", settings.connection.endpoint());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{PanelError, Result};

/// Default configuration file path, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/laser-panel.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Application settings.
    #[serde(default)]
    pub application: ApplicationConfig,
    /// Link settings (endpoint and timing).
    #[serde(default)]
    pub connection: ConnectionConfig,
    /// Inbound data settings.
    #[serde(default)]
    pub receive: ReceiveConfig,
}

/// Application-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name, used in the startup banner.
    #[serde(default = "default_name")]
    pub name: String,
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Endpoint and timing of the controller link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Controller host.
    #[serde(default = "default_host")]
    pub host: String,
    /// Controller TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// How long a single connect attempt may take.
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub connect_timeout: Duration,
    /// How often the supervisor checks the link. Flat interval, no backoff.
    #[serde(with = "humantime_serde", default = "default_poll_interval")]
    pub poll_interval: Duration,
}

/// Inbound data configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiveConfig {
    /// Size of the read buffer; also the maximum chunk size surfaced in a
    /// single `TextReceived` event.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

// Default value functions
fn default_name() -> String {
    "laser-panel".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    12345
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_buffer_size() -> usize {
    256
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout: default_connect_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

impl Default for ReceiveConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            application: ApplicationConfig::default(),
            connection: ConnectionConfig::default(),
            receive: ReceiveConfig::default(),
        }
    }
}

/// A `host:port` pair identifying the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Host name or address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl ConnectionConfig {
    /// The configured endpoint as a `host:port` pair.
    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        Endpoint {
            host: self.host.clone(),
            port: self.port,
        }
    }
}

impl Settings {
    /// Load configuration from [`DEFAULT_CONFIG_PATH`] and the environment.
    ///
    /// A missing file is fine; defaults cover every field.
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific file path and the environment.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings: Settings = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("LASER_PANEL_").split("__"))
            .extract()?;
        Ok(settings)
    }

    /// Validate configuration after loading.
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.as_str()) {
            return Err(PanelError::Validation(format!(
                "invalid log_level '{}'; must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            )));
        }

        if self.connection.host.trim().is_empty() {
            return Err(PanelError::Validation("host must not be empty".into()));
        }
        if self.connection.port == 0 {
            return Err(PanelError::Validation("port must be non-zero".into()));
        }
        if self.connection.poll_interval.is_zero() {
            return Err(PanelError::Validation(
                "poll_interval must be non-zero".into(),
            ));
        }
        if self.connection.connect_timeout.is_zero() {
            return Err(PanelError::Validation(
                "connect_timeout must be non-zero".into(),
            ));
        }
        if self.receive.buffer_size == 0 {
            return Err(PanelError::Validation(
                "receive buffer_size must be non-zero".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_target_a_local_controller() {
        let settings = Settings::default();
        assert_eq!(settings.connection.host, "127.0.0.1");
        assert_eq!(settings.connection.port, 12345);
        assert_eq!(settings.connection.poll_interval, Duration::from_secs(1));
        assert_eq!(settings.receive.buffer_size, 256);
        assert_eq!(settings.application.log_level, "info");
        settings.validate().unwrap();
    }

    #[test]
    fn parses_partial_toml() {
        let settings: Settings = toml::from_str(
            r#"
            [connection]
            host = "10.0.0.7"
            port = 5025
            poll_interval = "250ms"
            "#,
        )
        .unwrap();
        assert_eq!(settings.connection.host, "10.0.0.7");
        assert_eq!(settings.connection.port, 5025);
        assert_eq!(
            settings.connection.poll_interval,
            Duration::from_millis(250)
        );
        // Untouched sections keep their defaults
        assert_eq!(settings.receive.buffer_size, 256);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [application]
            log_level = "debug"

            [connection]
            port = 6000
            "#
        )
        .unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.application.log_level, "debug");
        assert_eq!(settings.connection.port, 6000);
        assert_eq!(settings.connection.host, "127.0.0.1");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = Settings::load_from("does/not/exist.toml").unwrap();
        assert_eq!(settings.connection.endpoint().to_string(), "127.0.0.1:12345");
    }

    #[test]
    fn rejects_bad_log_level() {
        let mut settings = Settings::default();
        settings.application.log_level = "loud".into();
        assert!(matches!(
            settings.validate(),
            Err(PanelError::Validation(_))
        ));
    }

    #[test]
    fn rejects_zero_port_and_empty_host() {
        let mut settings = Settings::default();
        settings.connection.port = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.connection.host = "  ".into();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_zero_durations_and_buffer() {
        let mut settings = Settings::default();
        settings.connection.poll_interval = Duration::ZERO;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.receive.buffer_size = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn endpoint_display() {
        let endpoint = Endpoint {
            host: "localhost".into(),
            port: 12345,
        };
        assert_eq!(endpoint.to_string(), "localhost:12345");
    }
}
