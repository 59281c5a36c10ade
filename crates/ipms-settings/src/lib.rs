//! # ipms-settings
//!
//! Configuration for the IPMS server.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`IpmsSettings::default()`]
//! 2. **User file**: `~/.ipms/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `IPMS_*`, `SECRET_KEY`, and `GOOGLE_*`
//!    overrides (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, apply_overrides, deep_merge, ipms_home, load_settings,
    load_settings_from_path, settings_path,
};
pub use types::*;
