//! Settings loading from layered providers.
//!
//! Loading flow:
//! 1. Start with compiled [`DatalakeSettings::default()`]
//! 2. If the JSON file exists, merge its values over the defaults
//! 3. Merge `DATALAKE_*` environment variables (highest priority)
//!
//! Nested keys use a double underscore in the environment:
//! `DATALAKE_SERVER__PORT=9000` sets `server.port`.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized};
use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::DatalakeSettings;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "DATALAKE_";

/// Default settings file, relative to the working directory.
pub fn default_settings_path() -> PathBuf {
    PathBuf::from("datalake.json")
}

/// Build the layered figment for `path`.
pub fn figment_for(path: &Path) -> Figment {
    let figment = Figment::from(Serialized::defaults(DatalakeSettings::default()));
    let figment = if path.exists() {
        debug!(?path, "loading settings from file");
        figment.merge(Json::file(path))
    } else {
        debug!(?path, "settings file not found, using defaults");
        figment
    };
    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<DatalakeSettings> {
    load_settings_from_path(&default_settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults; malformed JSON or an out-of-range value is
/// an error.
pub fn load_settings_from_path(path: &Path) -> Result<DatalakeSettings> {
    let settings: DatalakeSettings = figment_for(path).extract()?;
    validate(&settings)?;
    Ok(settings)
}

/// Reject values the streamer cannot run with.
pub fn validate(settings: &DatalakeSettings) -> Result<()> {
    if settings.server.host.trim().is_empty() {
        return Err(SettingsError::InvalidValue("server.host must not be empty".into()));
    }
    if settings.stream.tick_interval_ms == 0 {
        return Err(SettingsError::InvalidValue(
            "stream.tick_interval_ms must be at least 1".into(),
        ));
    }
    Ok(())
}
