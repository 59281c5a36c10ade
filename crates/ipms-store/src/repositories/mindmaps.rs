//! Mindmap repository: JSON documents attached to projects.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};

use ipms_core::models::{Mindmap, MindmapCreate};

use crate::errors::{Result, StoreError};
use crate::row_helpers::{get, get_json, query_all, query_opt};

const COLUMNS: &str = "id, project_id, title, data, created_at, updated_at";

/// Mindmap repository.
pub struct MindmapRepo;

impl MindmapRepo {
    /// Store a mindmap document.
    pub fn create(conn: &Connection, payload: &MindmapCreate, now: DateTime<Utc>) -> Result<Mindmap> {
        let _ = conn.execute(
            "INSERT INTO mindmaps (project_id, title, data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![
                payload.project_id,
                payload.title,
                serde_json::to_string(&payload.data)?,
                now
            ],
        )?;
        Self::get(conn, conn.last_insert_rowid())?.ok_or(StoreError::NotFound("Mindmap"))
    }

    /// Get a mindmap by id.
    pub fn get(conn: &Connection, id: i64) -> Result<Option<Mindmap>> {
        query_opt(
            conn,
            &format!("SELECT {COLUMNS} FROM mindmaps WHERE id = ?1"),
            params![id],
            map_row,
        )
    }

    /// Mindmaps of a project, most recently updated first.
    pub fn list_by_project(conn: &Connection, project_id: i64) -> Result<Vec<Mindmap>> {
        query_all(
            conn,
            &format!(
                "SELECT {COLUMNS} FROM mindmaps WHERE project_id = ?1
                 ORDER BY updated_at DESC, id DESC"
            ),
            params![project_id],
            map_row,
        )
    }

    /// Persist title and document.
    pub fn save(conn: &Connection, map: &Mindmap) -> Result<()> {
        let _ = conn.execute(
            "UPDATE mindmaps SET title = ?2, data = ?3, updated_at = ?4 WHERE id = ?1",
            params![map.id, map.title, serde_json::to_string(&map.data)?, map.updated_at],
        )?;
        Ok(())
    }

    /// Delete a mindmap. Returns whether it existed.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let changed = conn.execute("DELETE FROM mindmaps WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }
}

fn map_row(row: &Row<'_>) -> Result<Mindmap> {
    Ok(Mindmap {
        id: get(row, 0, "mindmaps", "id")?,
        project_id: get(row, 1, "mindmaps", "project_id")?,
        title: get(row, 2, "mindmaps", "title")?,
        data: get_json(row, 3, "mindmaps", "data")?,
        created_at: get(row, 4, "mindmaps", "created_at")?,
        updated_at: get(row, 5, "mindmaps", "updated_at")?,
    })
}
