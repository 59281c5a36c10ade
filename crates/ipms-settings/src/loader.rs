//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`IpmsSettings::default()`]
//! 2. If the settings file exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::IpmsSettings;

/// The IPMS data directory (`~/.ipms`).
pub fn ipms_home() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".ipms")
}

/// Resolve the path to the settings file (`~/.ipms/settings.json`).
pub fn settings_path() -> PathBuf {
    ipms_home().join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<IpmsSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<IpmsSettings> {
    let mut settings = load_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

fn load_file(path: &Path) -> Result<IpmsSettings> {
    let defaults = serde_json::to_value(IpmsSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(settings: &mut IpmsSettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Apply overrides from an arbitrary variable source.
///
/// Each variable has strict parsing rules:
/// - Integers must be valid and within the specified range
/// - Booleans accept: `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`
/// - Empty values are ignored; invalid values are logged and ignored
pub fn apply_overrides<F>(settings: &mut IpmsSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let env = EnvReader { lookup };

    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = env.string("IPMS_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = env.u16("IPMS_PORT", 1, 65535) {
        settings.server.port = v;
    }
    if let Some(v) = env.string("IPMS_CORS_ORIGINS") {
        settings.server.cors_origins = parse_list(&v);
    }
    if let Some(v) = env.string("IPMS_BUG_REPORTS_PATH") {
        settings.server.bug_reports_path = v;
    }

    // ── Database ────────────────────────────────────────────────────
    if let Some(v) = env.string("IPMS_DB_PATH") {
        settings.database.path = v;
    }
    if let Some(v) = env.i64("IPMS_DB_POOL_SIZE", 1, 64) {
        settings.database.pool_size = u32::try_from(v).unwrap_or(settings.database.pool_size);
    }

    // ── Auth ────────────────────────────────────────────────────────
    if let Some(v) = env.string("IPMS_SECRET_KEY").or_else(|| env.string("SECRET_KEY")) {
        settings.auth.secret_key = v;
    }
    if let Some(v) = env.i64("IPMS_ACCESS_TOKEN_MINUTES", 1, 24 * 60) {
        settings.auth.access_token_minutes = v;
    }
    if let Some(v) = env.i64("IPMS_REFRESH_TOKEN_DAYS", 1, 365) {
        settings.auth.refresh_token_days = v;
    }
    if let Some(v) = env.bool("IPMS_EXPOSE_RESET_TOKEN") {
        settings.auth.expose_reset_token = v;
    }
    if let Some(v) = env.bool("IPMS_COOKIE_SECURE") {
        settings.auth.cookie_secure = v;
    }

    // ── Google OAuth ────────────────────────────────────────────────
    if let Some(v) = env.string("GOOGLE_CLIENT_ID") {
        settings.google.client_id = Some(v);
    }
    if let Some(v) = env.string("GOOGLE_CLIENT_SECRET") {
        settings.google.client_secret = Some(v);
    }
    if let Some(v) = env.string("GOOGLE_REDIRECT_URI") {
        settings.google.redirect_uri = Some(v);
    }

    // ── AI / logging ────────────────────────────────────────────────
    if let Some(v) = env.string("IPMS_AI_MODEL") {
        settings.ai.default_model = v;
    }
    if let Some(v) = env.string("IPMS_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = env.bool("IPMS_LOG_JSON") {
        settings.logging.json = v;
    }
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as an `i64` within a range.
pub fn parse_i64_range(val: &str, min: i64, max: i64) -> Option<i64> {
    let n: i64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Split a comma-separated list, trimming entries and dropping blanks.
pub fn parse_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

// ── Variable readers ────────────────────────────────────────────────────────

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn raw(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn string(&self, name: &str) -> Option<String> {
        self.raw(name)
    }

    fn bool(&self, name: &str) -> Option<bool> {
        let val = self.raw(name)?;
        let result = parse_bool(&val);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
        }
        result
    }

    fn u16(&self, name: &str, min: u16, max: u16) -> Option<u16> {
        let val = self.raw(name)?;
        let result = parse_u16_range(&val, min, max);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid u16 env var, ignoring");
        }
        result
    }

    fn i64(&self, name: &str, min: i64, max: i64) -> Option<i64> {
        let val = self.raw(name)?;
        let result = parse_i64_range(&val, min, max);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid integer env var, ignoring");
        }
        result
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
