//! Server configuration.

use std::time::Duration;

use datalake_settings::{CadenceMode, DatalakeSettings, DEFAULT_PORT, DEFAULT_TICK_INTERVAL_MS};

/// Configuration for the streamer's listener and sessions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind (default `"0.0.0.0"`).
    pub host: String,
    /// Port to bind (default `8765`, `0` for auto-assign).
    pub port: u16,
    /// Behaviour shared by every stream session.
    pub stream: StreamConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            stream: StreamConfig::default(),
        }
    }
}

impl ServerConfig {
    /// `host:port` bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&DatalakeSettings> for ServerConfig {
    fn from(settings: &DatalakeSettings) -> Self {
        Self {
            host: settings.server.host.clone(),
            port: settings.server.port,
            stream: StreamConfig {
                tick_interval: settings.stream.tick_interval(),
                prefix: settings.stream.prefix.clone(),
                cadence: settings.stream.cadence,
            },
        }
    }
}

/// Per-session streaming parameters. Read-only once the server starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamConfig {
    /// Period between cycle starts.
    pub tick_interval: Duration,
    /// Prepended to every emitted variable name.
    pub prefix: String,
    /// How the wait between cycles is computed.
    pub cadence: CadenceMode,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            prefix: String::new(),
            cadence: CadenceMode::FixedDelay,
        }
    }
}
