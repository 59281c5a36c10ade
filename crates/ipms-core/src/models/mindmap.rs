use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{self, ValidationResult};

/// A project mindmap. `data` is an opaque JSON document owned by the client.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Mindmap {
    /// Row id.
    pub id: i64,
    /// Containing project.
    pub project_id: i64,
    /// Title.
    pub title: String,
    /// Node/edge document.
    pub data: serde_json::Value,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a mindmap.
#[derive(Clone, Debug, Deserialize)]
pub struct MindmapCreate {
    /// Title.
    pub title: String,
    /// Node/edge document; must be an object.
    pub data: serde_json::Value,
    /// Containing project.
    pub project_id: i64,
}

impl MindmapCreate {
    /// Check the title and document shape.
    pub fn validate(&self) -> ValidationResult {
        validation::title(&self.title)?;
        validation::json_object("data", &self.data)
    }
}

/// Partial mindmap update.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MindmapUpdate {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// Replacement document.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl MindmapUpdate {
    /// Check whichever fields are present.
    pub fn validate(&self) -> ValidationResult {
        validation::title_opt(self.title.as_deref())?;
        match &self.data {
            Some(data) => validation::json_object("data", data),
            None => Ok(()),
        }
    }
}

impl Mindmap {
    /// Merge `update` into this mindmap.
    pub fn apply(&mut self, update: MindmapUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(data) = update.data {
            self.data = data;
        }
    }
}
