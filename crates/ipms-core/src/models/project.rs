use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{MemberRole, ProjectActionType, ProjectSortField, ProjectStatus, SortOrder};
use crate::patch;
use crate::validation::{self, ValidationResult};

/// A project owned by one user and optionally shared with members.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Project {
    /// Row id.
    pub id: i64,
    /// Owning user.
    pub owner_id: i64,
    /// Title, 1 to 100 characters.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Lifecycle state.
    pub status: ProjectStatus,
    /// Start date, set at creation.
    pub start_date: DateTime<Utc>,
    /// Planned completion.
    pub target_end_date: Option<DateTime<Utc>>,
    /// Actual completion.
    pub actual_end_date: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a project.
#[derive(Clone, Debug, Deserialize)]
pub struct ProjectCreate {
    /// Title.
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Initial status; defaults to `planning`.
    #[serde(default)]
    pub status: ProjectStatus,
    /// Planned completion.
    #[serde(default)]
    pub target_end_date: Option<DateTime<Utc>>,
}

impl ProjectCreate {
    /// Check the title.
    pub fn validate(&self) -> ValidationResult {
        validation::title(&self.title)
    }
}

/// Partial project update. Nullable fields accept `null` to clear.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProjectUpdate {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description.
    #[serde(default, deserialize_with = "patch::double_option")]
    pub description: Option<Option<String>>,
    /// New status.
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    /// New planned completion.
    #[serde(default, deserialize_with = "patch::double_option")]
    pub target_end_date: Option<Option<DateTime<Utc>>>,
    /// New actual completion.
    #[serde(default, deserialize_with = "patch::double_option")]
    pub actual_end_date: Option<Option<DateTime<Utc>>>,
}

impl ProjectUpdate {
    /// Check the title if present.
    pub fn validate(&self) -> ValidationResult {
        validation::title_opt(self.title.as_deref())
    }

    /// Names of the fields this update touches, for the activity timeline.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        if self.target_end_date.is_some() {
            fields.push("target_end_date");
        }
        if self.actual_end_date.is_some() {
            fields.push("actual_end_date");
        }
        fields
    }
}

impl Project {
    /// Merge `update` into this project.
    pub fn apply(&mut self, update: ProjectUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        patch::apply(&mut self.description, update.description);
        if let Some(status) = update.status {
            self.status = status;
        }
        patch::apply(&mut self.target_end_date, update.target_end_date);
        patch::apply(&mut self.actual_end_date, update.actual_end_date);
    }
}

/// Query parameters for listing projects.
#[derive(Clone, Debug, Deserialize)]
pub struct ProjectFilter {
    /// Only projects in this state.
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    /// Rows to skip.
    #[serde(default)]
    pub skip: u32,
    /// Page size, 1 to 100.
    #[serde(default = "super::default_page_limit")]
    pub limit: u32,
    /// Sort column.
    #[serde(default)]
    pub sort_by: Option<ProjectSortField>,
    /// Sort direction; defaults to descending.
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
}

impl Default for ProjectFilter {
    fn default() -> Self {
        Self {
            status: None,
            skip: 0,
            limit: super::default_page_limit(),
            sort_by: None,
            sort_order: None,
        }
    }
}

impl ProjectFilter {
    /// Check the page size.
    pub fn validate(&self) -> ValidationResult {
        validation::limit(self.limit)
    }
}

/// A user's membership in a project, joined with their public profile.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProjectMember {
    /// Project id.
    pub project_id: i64,
    /// Member user id.
    pub user_id: i64,
    /// Member login name.
    pub username: String,
    /// Member display name.
    pub full_name: Option<String>,
    /// Role in the project.
    pub role: MemberRole,
    /// When the membership started.
    pub joined_at: DateTime<Utc>,
}

/// Payload for adding a member.
#[derive(Clone, Debug, Deserialize)]
pub struct MemberAdd {
    /// User to add.
    pub user_id: i64,
    /// Role; defaults to `member`. `owner` is rejected.
    #[serde(default)]
    pub role: MemberRole,
}

impl MemberAdd {
    /// Reject attempts to add a second owner.
    pub fn validate(&self) -> ValidationResult {
        if self.role == MemberRole::Owner {
            return Err(validation::ValidationError::new(
                "role",
                "a project has exactly one owner",
            ));
        }
        Ok(())
    }
}

/// An entry in a project's activity timeline.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProjectActivity {
    /// Row id.
    pub id: i64,
    /// Project the entry belongs to.
    pub project_id: i64,
    /// User who performed the action.
    pub user_id: i64,
    /// What happened.
    pub action_type: ProjectActionType,
    /// Human-readable summary.
    pub description: String,
    /// Structured details.
    pub metadata: serde_json::Value,
    /// When it happened.
    pub created_at: DateTime<Utc>,
}
