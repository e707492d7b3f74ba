//! Settings structures and their compiled defaults.

use std::time::Duration;

use datalake_logging::{LogFormat, LogLevel};
use serde::{Deserialize, Serialize};

/// Default `WebSocket` port, as exposed by the extension manifest.
pub const DEFAULT_PORT: u16 = 8765;

/// Default tick period (10 Hz).
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;

/// Root settings object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatalakeSettings {
    /// Listener settings.
    pub server: ServerSettings,
    /// Stream session settings.
    pub stream: StreamSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Where the listener binds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind host (all interfaces by default).
    pub host: String,
    /// Bind port (`0` picks a free port).
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: DEFAULT_PORT,
        }
    }
}

/// How the wait between two ticks is computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CadenceMode {
    /// Sleep one full period after each cycle. Cadence drifts by the time
    /// spent sending.
    #[default]
    FixedDelay,
    /// Start each cycle on a period boundary measured from the first tick.
    Aligned,
}

/// Per-session streaming behaviour.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    /// Tick period in milliseconds.
    pub tick_interval_ms: u64,
    /// Prepended to every variable name (e.g. `"test-"`).
    pub prefix: String,
    /// Cadence mode.
    pub cadence: CadenceMode,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            prefix: String::new(),
            cadence: CadenceMode::default(),
        }
    }
}

impl StreamSettings {
    /// Tick period as a `Duration`.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Log output settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Minimum level when `RUST_LOG` is unset.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
}
