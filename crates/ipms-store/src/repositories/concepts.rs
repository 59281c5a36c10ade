//! Concept note repository.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};

use ipms_core::models::{ConceptNote, ConceptNoteCreate};

use crate::errors::{Result, StoreError};
use crate::row_helpers::{get, query_all, query_opt};

const COLUMNS: &str = "id, project_id, user_id, title, content, created_at, updated_at";

/// Concept note repository.
///
/// Project access is checked by the caller; these queries only scope by id.
pub struct ConceptNoteRepo;

impl ConceptNoteRepo {
    /// Create a note in `payload.project_id` authored by `user_id`.
    pub fn create(
        conn: &Connection,
        user_id: i64,
        payload: &ConceptNoteCreate,
        now: DateTime<Utc>,
    ) -> Result<ConceptNote> {
        let _ = conn.execute(
            "INSERT INTO concept_notes (project_id, user_id, title, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![payload.project_id, user_id, payload.title, payload.content, now],
        )?;
        Self::get(conn, conn.last_insert_rowid())?.ok_or(StoreError::NotFound("Concept note"))
    }

    /// Get a note by id.
    pub fn get(conn: &Connection, id: i64) -> Result<Option<ConceptNote>> {
        query_opt(
            conn,
            &format!("SELECT {COLUMNS} FROM concept_notes WHERE id = ?1"),
            params![id],
            map_row,
        )
    }

    /// Notes of a project, newest first.
    pub fn list_by_project(conn: &Connection, project_id: i64) -> Result<Vec<ConceptNote>> {
        query_all(
            conn,
            &format!(
                "SELECT {COLUMNS} FROM concept_notes WHERE project_id = ?1
                 ORDER BY created_at DESC, id DESC"
            ),
            params![project_id],
            map_row,
        )
    }

    /// Persist title and content.
    pub fn save(conn: &Connection, note: &ConceptNote) -> Result<()> {
        let _ = conn.execute(
            "UPDATE concept_notes SET title = ?2, content = ?3, updated_at = ?4 WHERE id = ?1",
            params![note.id, note.title, note.content, note.updated_at],
        )?;
        Ok(())
    }

    /// Delete a note. Returns whether it existed.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let changed = conn.execute("DELETE FROM concept_notes WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }
}

fn map_row(row: &Row<'_>) -> Result<ConceptNote> {
    Ok(ConceptNote {
        id: get(row, 0, "concept_notes", "id")?,
        project_id: get(row, 1, "concept_notes", "project_id")?,
        user_id: get(row, 2, "concept_notes", "user_id")?,
        title: get(row, 3, "concept_notes", "title")?,
        content: get(row, 4, "concept_notes", "content")?,
        created_at: get(row, 5, "concept_notes", "created_at")?,
        updated_at: get(row, 6, "concept_notes", "updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::ProjectRepo;
    use crate::repositories::test_support::{project, setup, user};

    #[test]
    fn crud_and_project_cascade() {
        let conn = setup();
        let alice = user(&conn, "alice");
        let p = project(&conn, &alice, "Apollo");
        let payload = ConceptNoteCreate {
            title: "Vision".into(),
            content: "Land on the moon".into(),
            project_id: p.id,
        };
        let mut note = ConceptNoteRepo::create(&conn, alice.id, &payload, Utc::now()).unwrap();
        assert_eq!(note.user_id, alice.id);

        note.content = "Land twice".into();
        ConceptNoteRepo::save(&conn, &note).unwrap();
        let listed = ConceptNoteRepo::list_by_project(&conn, p.id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].content, "Land twice");

        assert!(ProjectRepo::delete(&conn, p.id).unwrap());
        assert!(ConceptNoteRepo::get(&conn, note.id).unwrap().is_none());
        assert!(!ConceptNoteRepo::delete(&conn, note.id).unwrap());
    }
}
