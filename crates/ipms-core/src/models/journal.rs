use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::patch;
use crate::validation::{self, ValidationResult};

/// A named collection of journal entries.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Journal {
    /// Row id.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Title.
    pub title: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating or renaming a journal.
#[derive(Clone, Debug, Deserialize)]
pub struct JournalCreate {
    /// Title.
    pub title: String,
}

impl JournalCreate {
    /// Check the title.
    pub fn validate(&self) -> ValidationResult {
        validation::title(&self.title)
    }
}

/// A single dated entry inside a journal.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct JournalEntry {
    /// Row id.
    pub id: i64,
    /// Containing journal.
    pub journal_id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Body text.
    pub content: String,
    /// Free-form mood label.
    pub mood: Option<String>,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Payload for writing an entry.
#[derive(Clone, Debug, Deserialize)]
pub struct JournalEntryCreate {
    /// Body text.
    pub content: String,
    /// Mood label.
    #[serde(default)]
    pub mood: Option<String>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl JournalEntryCreate {
    /// Content must not be blank.
    pub fn validate(&self) -> ValidationResult {
        non_blank_content(&self.content)
    }
}

/// Partial entry update.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct JournalEntryUpdate {
    /// New body text.
    #[serde(default)]
    pub content: Option<String>,
    /// New mood; `null` clears.
    #[serde(default, deserialize_with = "patch::double_option")]
    pub mood: Option<Option<String>>,
    /// Replacement tag list.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl JournalEntryUpdate {
    /// Content, when present, must not be blank.
    pub fn validate(&self) -> ValidationResult {
        self.content
            .as_deref()
            .map_or(Ok(()), non_blank_content)
    }
}

impl JournalEntry {
    /// Merge `update` into this entry.
    pub fn apply(&mut self, update: JournalEntryUpdate) {
        if let Some(content) = update.content {
            self.content = content;
        }
        patch::apply(&mut self.mood, update.mood);
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
    }
}

fn non_blank_content(content: &str) -> ValidationResult {
    if content.trim().is_empty() {
        return Err(validation::ValidationError::new(
            "content",
            "must not be empty",
        ));
    }
    Ok(())
}

/// Query parameters for listing entries.
#[derive(Clone, Debug, Deserialize)]
pub struct JournalEntryFilter {
    /// Written at or after.
    #[serde(default)]
    pub from_date: Option<DateTime<Utc>>,
    /// Written at or before.
    #[serde(default)]
    pub to_date: Option<DateTime<Utc>>,
    /// Only entries with this mood.
    #[serde(default)]
    pub mood: Option<String>,
    /// Only entries carrying this tag.
    #[serde(default)]
    pub tag: Option<String>,
    /// Page size, 1 to 100.
    #[serde(default = "super::default_feed_limit")]
    pub limit: u32,
}

impl Default for JournalEntryFilter {
    fn default() -> Self {
        Self {
            from_date: None,
            to_date: None,
            mood: None,
            tag: None,
            limit: super::default_feed_limit(),
        }
    }
}

impl JournalEntryFilter {
    /// Check the page size.
    pub fn validate(&self) -> ValidationResult {
        validation::limit(self.limit)
    }
}
