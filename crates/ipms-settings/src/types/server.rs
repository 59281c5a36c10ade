//! Server, database, and logging settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// HTTP listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Origins allowed to make credentialed cross-origin requests.
    pub cors_origins: Vec<String>,
    /// Markdown file bug reports are appended to.
    pub bug_reports_path: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["http://localhost:3000".to_string()],
            bug_reports_path: "BUG_REPORTS/BUG_REPORTS.md".to_string(),
        }
    }
}

/// `SQLite` database settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSettings {
    /// Database file. Relative paths resolve against `~/.ipms`.
    pub path: String,
    /// Maximum pooled connections.
    pub pool_size: u32,
    /// `SQLite` busy timeout in milliseconds.
    pub busy_timeout_ms: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "ipms.db".to_string(),
            pool_size: 8,
            busy_timeout_ms: 30_000,
        }
    }
}

impl DatabaseSettings {
    /// Absolute database path.
    pub fn resolved_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.path);
        if path.is_absolute() {
            path
        } else {
            crate::loader::ipms_home().join(path)
        }
    }
}

/// Log output settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_database_path_kept() {
        let db = DatabaseSettings {
            path: "/var/lib/ipms/ipms.db".into(),
            ..DatabaseSettings::default()
        };
        assert_eq!(db.resolved_path(), PathBuf::from("/var/lib/ipms/ipms.db"));
    }

    #[test]
    fn relative_database_path_under_home() {
        let db = DatabaseSettings::default();
        assert!(db.resolved_path().ends_with(".ipms/ipms.db"));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let server: ServerSettings = serde_json::from_str(r#"{"port": 9000}"#).unwrap();
        assert_eq!(server.port, 9000);
        assert_eq!(server.host, "0.0.0.0");
    }
}
