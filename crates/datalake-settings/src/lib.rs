//! # datalake-settings
//!
//! Configuration with layered sources for the data lake streamer.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`DatalakeSettings::default()`]
//! 2. **Settings file**: `datalake.json` or a path given on the command line
//! 3. **Environment variables**: `DATALAKE_*` overrides (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{default_settings_path, load_settings, load_settings_from_path};
pub use types::*;
