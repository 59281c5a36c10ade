//! Project membership repository.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};

use ipms_core::MemberRole;
use ipms_core::models::ProjectMember;

use crate::errors::{Result, StoreError};
use crate::row_helpers::{get, get_enum, query_all, query_opt};

const SELECT: &str = "SELECT m.project_id, m.user_id, u.username, u.full_name, m.role, m.joined_at
                      FROM project_members m JOIN users u ON u.id = m.user_id";

/// Membership repository.
pub struct MemberRepo;

impl MemberRepo {
    /// Members of a project, owner first, then by join time.
    pub fn list(conn: &Connection, project_id: i64) -> Result<Vec<ProjectMember>> {
        query_all(
            conn,
            &format!(
                "{SELECT} WHERE m.project_id = ?1
                 ORDER BY m.role = 'owner' DESC, m.joined_at, u.username"
            ),
            params![project_id],
            map_row,
        )
    }

    /// One membership.
    pub fn get(conn: &Connection, project_id: i64, user_id: i64) -> Result<Option<ProjectMember>> {
        query_opt(
            conn,
            &format!("{SELECT} WHERE m.project_id = ?1 AND m.user_id = ?2"),
            params![project_id, user_id],
            map_row,
        )
    }

    /// Enroll a user. An existing membership yields a conflict.
    pub fn add(
        conn: &Connection,
        project_id: i64,
        user_id: i64,
        role: MemberRole,
        now: DateTime<Utc>,
    ) -> Result<ProjectMember> {
        let _ = conn
            .execute(
                "INSERT INTO project_members (project_id, user_id, role, joined_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![project_id, user_id, role.as_str(), now],
            )
            .map_err(|e| StoreError::on_conflict(e, "User is already a member of this project"))?;
        Self::get(conn, project_id, user_id)?.ok_or(StoreError::NotFound("Member"))
    }

    /// Remove a membership. Returns whether it existed.
    pub fn remove(conn: &Connection, project_id: i64, user_id: i64) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM project_members WHERE project_id = ?1 AND user_id = ?2",
            params![project_id, user_id],
        )?;
        Ok(changed > 0)
    }
}

fn map_row(row: &Row<'_>) -> Result<ProjectMember> {
    Ok(ProjectMember {
        project_id: get(row, 0, "project_members", "project_id")?,
        user_id: get(row, 1, "project_members", "user_id")?,
        username: get(row, 2, "users", "username")?,
        full_name: get(row, 3, "users", "full_name")?,
        role: get_enum(row, 4, "project_members", "role")?,
        joined_at: get(row, 5, "project_members", "joined_at")?,
    })
}
