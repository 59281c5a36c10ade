//! Project activity timeline repository.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};

use ipms_core::ProjectActionType;
use ipms_core::models::ProjectActivity;

use crate::errors::{Result, StoreError};
use crate::row_helpers::{get, get_enum, get_json, query_all, query_opt};

const COLUMNS: &str = "id, project_id, user_id, action_type, description, metadata, created_at";

/// Timeline repository.
pub struct ProjectActivityRepo;

impl ProjectActivityRepo {
    /// Append a timeline entry.
    pub fn record(
        conn: &Connection,
        project_id: i64,
        user_id: i64,
        action: ProjectActionType,
        description: &str,
        metadata: &serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<ProjectActivity> {
        let _ = conn.execute(
            "INSERT INTO project_activities
                 (project_id, user_id, action_type, description, metadata, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                project_id,
                user_id,
                action.as_str(),
                description,
                serde_json::to_string(metadata)?,
                now
            ],
        )?;
        query_opt(
            conn,
            &format!("SELECT {COLUMNS} FROM project_activities WHERE id = ?1"),
            params![conn.last_insert_rowid()],
            map_row,
        )?
        .ok_or(StoreError::NotFound("Project activity"))
    }

    /// Most recent entries of a project, newest first.
    pub fn list(conn: &Connection, project_id: i64, limit: u32) -> Result<Vec<ProjectActivity>> {
        query_all(
            conn,
            &format!(
                "SELECT {COLUMNS} FROM project_activities WHERE project_id = ?1
                 ORDER BY created_at DESC, id DESC LIMIT ?2"
            ),
            params![project_id, limit],
            map_row,
        )
    }
}

fn map_row(row: &Row<'_>) -> Result<ProjectActivity> {
    Ok(ProjectActivity {
        id: get(row, 0, "project_activities", "id")?,
        project_id: get(row, 1, "project_activities", "project_id")?,
        user_id: get(row, 2, "project_activities", "user_id")?,
        action_type: get_enum(row, 3, "project_activities", "action_type")?,
        description: get(row, 4, "project_activities", "description")?,
        metadata: get_json(row, 5, "project_activities", "metadata")?,
        created_at: get(row, 6, "project_activities", "created_at")?,
    })
}
