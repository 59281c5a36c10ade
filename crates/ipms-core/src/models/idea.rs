use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::IdeaStatus;
use crate::validation::{self, MAX_LABEL_LEN, ValidationResult};

/// A free-standing idea with tags, linkable to projects.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Idea {
    /// Row id.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Title, 1 to 100 characters.
    pub title: String,
    /// Description.
    pub description: String,
    /// Maturity.
    pub status: IdeaStatus,
    /// Attached tags, ordered by name.
    pub tags: Vec<Tag>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// A globally unique tag name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Row id.
    pub id: i64,
    /// Name.
    pub name: String,
}

/// Payload for creating an idea.
#[derive(Clone, Debug, Deserialize)]
pub struct IdeaCreate {
    /// Title.
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Initial status; defaults to `draft`.
    #[serde(default)]
    pub status: IdeaStatus,
    /// Tag names, created on demand.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl IdeaCreate {
    /// Check title and tag names.
    pub fn validate(&self) -> ValidationResult {
        validation::title(&self.title)?;
        validate_tags(&self.tags)
    }
}

/// Partial idea update. A present `tags` list replaces the whole set.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct IdeaUpdate {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New status.
    #[serde(default)]
    pub status: Option<IdeaStatus>,
    /// Replacement tag names.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl IdeaUpdate {
    /// Check title and tags if present.
    pub fn validate(&self) -> ValidationResult {
        validation::title_opt(self.title.as_deref())?;
        self.tags.as_deref().map_or(Ok(()), validate_tags)
    }
}

impl Idea {
    /// Merge scalar fields of `update`. Tags are handled by the store.
    pub fn apply(&mut self, update: &IdeaUpdate) {
        if let Some(title) = &update.title {
            self.title.clone_from(title);
        }
        if let Some(description) = &update.description {
            self.description.clone_from(description);
        }
        if let Some(status) = update.status {
            self.status = status;
        }
    }
}

/// Trim, drop blanks, and deduplicate tag names, preserving first occurrence.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let name = tag.trim();
        if !name.is_empty() && !out.iter().any(|t| t == name) {
            out.push(name.to_owned());
        }
    }
    out
}

fn validate_tags(tags: &[String]) -> ValidationResult {
    for tag in normalize_tags(tags) {
        validation::text("tags", &tag, MAX_LABEL_LEN)?;
    }
    Ok(())
}

/// Query parameters for listing ideas.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct IdeaFilter {
    /// Only ideas in this state.
    #[serde(default)]
    pub status: Option<IdeaStatus>,
    /// Only ideas carrying this tag name.
    #[serde(default)]
    pub tag: Option<String>,
}

/// Query for ideas not yet linked to a project.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct AvailableIdeasQuery {
    /// Project to check links against.
    pub project_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_dedups() {
        let tags = vec![
            " rust ".to_string(),
            "web".to_string(),
            "rust".to_string(),
            "   ".to_string(),
        ];
        assert_eq!(normalize_tags(&tags), vec!["rust", "web"]);
    }

    #[test]
    fn create_rejects_long_tag() {
        let payload = IdeaCreate {
            title: "idea".into(),
            description: String::new(),
            status: IdeaStatus::Draft,
            tags: vec!["x".repeat(51)],
        };
        assert_eq!(payload.validate().unwrap_err().field, "tags");
    }

    #[test]
    fn update_without_tags_is_valid() {
        let update: IdeaUpdate = serde_json::from_str(r#"{"status": "archived"}"#).unwrap();
        assert!(update.validate().is_ok());
        assert!(update.tags.is_none());
    }
}
