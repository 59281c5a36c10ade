use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::LogType;
use crate::patch;
use crate::validation::{self, ValidationResult};

/// A titled log, optionally attached to a project.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Log {
    /// Row id.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Related project.
    pub project_id: Option<i64>,
    /// Title.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Kind of log.
    pub log_type: LogType,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a log.
#[derive(Clone, Debug, Deserialize)]
pub struct LogCreate {
    /// Title.
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub content: String,
    /// Kind; defaults to `note`.
    #[serde(default)]
    pub log_type: LogType,
    /// Related project.
    #[serde(default)]
    pub project_id: Option<i64>,
}

impl LogCreate {
    /// Check the title.
    pub fn validate(&self) -> ValidationResult {
        validation::title(&self.title)
    }
}

/// Partial log update.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LogUpdate {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New body text.
    #[serde(default)]
    pub content: Option<String>,
    /// New kind.
    #[serde(default)]
    pub log_type: Option<LogType>,
    /// Reattach or detach; `null` detaches.
    #[serde(default, deserialize_with = "patch::double_option")]
    pub project_id: Option<Option<i64>>,
}

impl LogUpdate {
    /// Check the title if present.
    pub fn validate(&self) -> ValidationResult {
        validation::title_opt(self.title.as_deref())
    }
}

impl Log {
    /// Merge `update` into this log.
    pub fn apply(&mut self, update: LogUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(log_type) = update.log_type {
            self.log_type = log_type;
        }
        patch::apply(&mut self.project_id, update.project_id);
    }
}

/// Query parameters for listing logs.
#[derive(Clone, Debug, Deserialize)]
pub struct LogFilter {
    /// Only logs of this project.
    #[serde(default)]
    pub project_id: Option<i64>,
    /// Only logs of this kind.
    #[serde(default)]
    pub log_type: Option<LogType>,
    /// Rows to skip.
    #[serde(default)]
    pub skip: u32,
    /// Page size, 1 to 100.
    #[serde(default = "super::default_page_limit")]
    pub limit: u32,
}

impl Default for LogFilter {
    fn default() -> Self {
        Self {
            project_id: None,
            log_type: None,
            skip: 0,
            limit: super::default_page_limit(),
        }
    }
}

impl LogFilter {
    /// Check the page size.
    pub fn validate(&self) -> ValidationResult {
        validation::limit(self.limit)
    }
}

/// A timestamped line appended to a log.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogEntry {
    /// Row id.
    pub id: i64,
    /// Containing log.
    pub log_id: i64,
    /// Author.
    pub user_id: i64,
    /// Body text.
    pub content: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating or replacing a log entry.
#[derive(Clone, Debug, Deserialize)]
pub struct LogEntryWrite {
    /// Body text.
    pub content: String,
}

impl LogEntryWrite {
    /// Content must not be blank.
    pub fn validate(&self) -> ValidationResult {
        if self.content.trim().is_empty() {
            return Err(validation::ValidationError::new(
                "content",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

/// Pagination for log entries.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Page {
    /// Rows to skip.
    #[serde(default)]
    pub skip: u32,
    /// Page size, 1 to 100.
    #[serde(default = "super::default_page_limit")]
    pub limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: super::default_page_limit(),
        }
    }
}

impl Page {
    /// Check the page size.
    pub fn validate(self) -> ValidationResult {
        validation::limit(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_defaults_log_type() {
        let payload: LogCreate = serde_json::from_str(r#"{"title": "Standup"}"#).unwrap();
        assert_eq!(payload.log_type, LogType::Note);
        assert_eq!(payload.content, "");
    }

    #[test]
    fn apply_detaches_project() {
        let now = Utc::now();
        let mut log = Log {
            id: 1,
            user_id: 1,
            project_id: Some(3),
            title: "t".into(),
            content: String::new(),
            log_type: LogType::Note,
            created_at: now,
            updated_at: now,
        };
        let update: LogUpdate =
            serde_json::from_str(r#"{"project_id": null, "log_type": "issue"}"#).unwrap();
        log.apply(update);
        assert_eq!(log.project_id, None);
        assert_eq!(log.log_type, LogType::Issue);
    }

    #[test]
    fn page_defaults() {
        let page: Page = serde_json::from_str("{}").unwrap();
        assert_eq!(page.skip, 0);
        assert_eq!(page.limit, 10);
    }
}
