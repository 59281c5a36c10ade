//! Project repository: CRUD for `projects` plus access resolution.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};

use ipms_core::models::{Project, ProjectCreate, ProjectFilter};
use ipms_core::{MemberRole, ProjectSortField, SortOrder};

use crate::errors::{Result, StoreError};
use crate::row_helpers::{Conditions, get, get_enum, query_all, query_opt};

const COLUMNS: &str = "p.id, p.owner_id, p.title, p.description, p.status, p.start_date,
                       p.target_end_date, p.actual_end_date, p.created_at, p.updated_at";

/// How the caller relates to a project.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// The caller owns the project and may modify it.
    Owner,
    /// The caller is a member with read access.
    Member,
}

/// Project repository.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a project and enroll its owner as an `owner` member.
    pub fn create(
        conn: &Connection,
        owner_id: i64,
        payload: &ProjectCreate,
        now: DateTime<Utc>,
    ) -> Result<Project> {
        let _ = conn.execute(
            "INSERT INTO projects (owner_id, title, description, status, start_date,
                                   target_end_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?5, ?5)",
            params![
                owner_id,
                payload.title,
                payload.description,
                payload.status.as_str(),
                now,
                payload.target_end_date
            ],
        )?;
        let id = conn.last_insert_rowid();
        let _ = conn.execute(
            "INSERT INTO project_members (project_id, user_id, role, joined_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![id, owner_id, MemberRole::Owner.as_str(), now],
        )?;
        Self::get(conn, id)?.ok_or(StoreError::NotFound("Project"))
    }

    /// Get a project by id, without access checks.
    pub fn get(conn: &Connection, id: i64) -> Result<Option<Project>> {
        query_opt(
            conn,
            &format!("SELECT {COLUMNS} FROM projects p WHERE p.id = ?1"),
            params![id],
            map_row,
        )
    }

    /// Get a project the user owns or is a member of.
    pub fn get_accessible(
        conn: &Connection,
        id: i64,
        user_id: i64,
    ) -> Result<Option<(Project, Access)>> {
        query_opt(
            conn,
            &format!(
                "SELECT {COLUMNS} FROM projects p
                 WHERE p.id = ?1
                   AND (p.owner_id = ?2 OR EXISTS (
                         SELECT 1 FROM project_members m
                         WHERE m.project_id = p.id AND m.user_id = ?2))"
            ),
            params![id, user_id],
            |row| {
                let project = map_row(row)?;
                let access = if project.owner_id == user_id {
                    Access::Owner
                } else {
                    Access::Member
                };
                Ok((project, access))
            },
        )
    }

    /// Projects the user owns or is a member of, filtered, sorted, and paged.
    pub fn list_accessible(
        conn: &Connection,
        user_id: i64,
        filter: &ProjectFilter,
    ) -> Result<Vec<Project>> {
        let mut cond = Conditions::new(
            "(p.owner_id = ? OR p.id IN (SELECT project_id FROM project_members WHERE user_id = ?))",
            user_id,
        );
        cond.push_opt("p.status = ?", filter.status.map(|s| s.as_str().to_owned()));

        let column = match filter.sort_by.unwrap_or_default() {
            ProjectSortField::CreatedAt => "p.created_at",
            ProjectSortField::UpdatedAt => "p.updated_at",
            ProjectSortField::Title => "p.title COLLATE NOCASE",
            ProjectSortField::Status => "p.status",
        };
        let order = filter.sort_order.unwrap_or(SortOrder::Desc).sql();
        let limit = cond.bind(filter.limit);
        let offset = cond.bind(filter.skip);

        let sql = format!(
            "SELECT {COLUMNS} FROM projects p WHERE {}
             ORDER BY {column} {order}, p.id {order}
             LIMIT {limit} OFFSET {offset}",
            cond.sql()
        );
        query_all(conn, &sql, cond.params(), map_row)
    }

    /// Persist every mutable field of `project`.
    pub fn save(conn: &Connection, project: &Project) -> Result<()> {
        let changed = conn.execute(
            "UPDATE projects
             SET title = ?2, description = ?3, status = ?4, target_end_date = ?5,
                 actual_end_date = ?6, updated_at = ?7
             WHERE id = ?1",
            params![
                project.id,
                project.title,
                project.description,
                project.status.as_str(),
                project.target_end_date,
                project.actual_end_date,
                project.updated_at
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound("Project"));
        }
        Ok(())
    }

    /// Delete a project; dependent rows cascade. Returns whether it existed.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let changed = conn.execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }
}

fn map_row(row: &Row<'_>) -> Result<Project> {
    Ok(Project {
        id: get(row, 0, "projects", "id")?,
        owner_id: get(row, 1, "projects", "owner_id")?,
        title: get(row, 2, "projects", "title")?,
        description: get(row, 3, "projects", "description")?,
        status: get_enum(row, 4, "projects", "status")?,
        start_date: get(row, 5, "projects", "start_date")?,
        target_end_date: get(row, 6, "projects", "target_end_date")?,
        actual_end_date: get(row, 7, "projects", "actual_end_date")?,
        created_at: get(row, 8, "projects", "created_at")?,
        updated_at: get(row, 9, "projects", "updated_at")?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
