use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{self, ValidationResult};

/// A note attached to a project, authored by one user.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConceptNote {
    /// Row id.
    pub id: i64,
    /// Containing project.
    pub project_id: i64,
    /// Author.
    pub user_id: i64,
    /// Title, 1 to 100 characters.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a concept note.
#[derive(Clone, Debug, Deserialize)]
pub struct ConceptNoteCreate {
    /// Title.
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub content: String,
    /// Containing project.
    pub project_id: i64,
}

impl ConceptNoteCreate {
    /// Check the title.
    pub fn validate(&self) -> ValidationResult {
        validation::title(&self.title)
    }
}

/// Partial concept note update.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ConceptNoteUpdate {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New body text.
    #[serde(default)]
    pub content: Option<String>,
}

impl ConceptNoteUpdate {
    /// Check the title if present.
    pub fn validate(&self) -> ValidationResult {
        validation::title_opt(self.title.as_deref())
    }
}

impl ConceptNote {
    /// Merge `update` into this note.
    pub fn apply(&mut self, update: ConceptNoteUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
    }
}
