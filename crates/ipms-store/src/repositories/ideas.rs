//! Idea and tag repositories, including idea↔project links.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use ipms_core::models::{Idea, IdeaCreate, IdeaFilter, Tag, normalize_tags};

use crate::errors::{Result, StoreError};
use crate::row_helpers::{Conditions, get, get_enum, query_all, query_opt};

const COLUMNS: &str = "i.id, i.user_id, i.title, i.description, i.status, i.created_at, i.updated_at";

/// Idea repository.
///
/// Ideas are returned with their tags attached.
pub struct IdeaRepo;

impl IdeaRepo {
    /// Create an idea and attach its tags, creating missing tags by name.
    pub fn create(conn: &Connection, user_id: i64, payload: &IdeaCreate, now: DateTime<Utc>) -> Result<Idea> {
        let _ = conn.execute(
            "INSERT INTO ideas (user_id, title, description, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                user_id,
                payload.title,
                payload.description,
                payload.status.as_str(),
                now
            ],
        )?;
        let id = conn.last_insert_rowid();
        replace_tags(conn, id, &payload.tags)?;
        Self::get(conn, id, user_id)?.ok_or(StoreError::NotFound("Idea"))
    }

    /// Get an idea owned by `user_id`.
    pub fn get(conn: &Connection, id: i64, user_id: i64) -> Result<Option<Idea>> {
        let idea = query_opt(
            conn,
            &format!("SELECT {COLUMNS} FROM ideas i WHERE i.id = ?1 AND i.user_id = ?2"),
            params![id, user_id],
            map_row,
        )?;
        match idea {
            Some(mut idea) => {
                idea.tags = tags_of(conn, idea.id)?;
                Ok(Some(idea))
            }
            None => Ok(None),
        }
    }

    /// The user's ideas, newest first, optionally by status and tag name.
    pub fn list(conn: &Connection, user_id: i64, filter: &IdeaFilter) -> Result<Vec<Idea>> {
        let mut cond = Conditions::new("i.user_id = ?", user_id);
        cond.push_opt("i.status = ?", filter.status.map(|s| s.as_str().to_owned()));
        cond.push_opt(
            "EXISTS (SELECT 1 FROM idea_tags it JOIN tags t ON t.id = it.tag_id
                     WHERE it.idea_id = i.id AND t.name = ?)",
            filter.tag.as_deref().map(str::trim).map(str::to_owned),
        );
        let sql = format!(
            "SELECT {COLUMNS} FROM ideas i WHERE {} ORDER BY i.created_at DESC, i.id DESC",
            cond.sql()
        );
        let ideas = query_all(conn, &sql, cond.params(), map_row)?;
        with_tags(conn, ideas)
    }

    /// Persist title, description and status. `tags`, when given, replaces the set.
    pub fn save(conn: &Connection, idea: &Idea, tags: Option<&[String]>) -> Result<()> {
        let _ = conn.execute(
            "UPDATE ideas SET title = ?2, description = ?3, status = ?4, updated_at = ?5
             WHERE id = ?1",
            params![
                idea.id,
                idea.title,
                idea.description,
                idea.status.as_str(),
                idea.updated_at
            ],
        )?;
        if let Some(tags) = tags {
            let _ = conn.execute("DELETE FROM idea_tags WHERE idea_id = ?1", params![idea.id])?;
            replace_tags(conn, idea.id, tags)?;
        }
        Ok(())
    }

    /// Delete an idea. Returns whether it existed.
    pub fn delete(conn: &Connection, id: i64, user_id: i64) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM ideas WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(changed > 0)
    }

    /// Ideas linked to a project, most recently linked first.
    pub fn list_by_project(conn: &Connection, project_id: i64) -> Result<Vec<Idea>> {
        let ideas = query_all(
            conn,
            &format!(
                "SELECT {COLUMNS} FROM ideas i
                 JOIN project_ideas pi ON pi.idea_id = i.id
                 WHERE pi.project_id = ?1
                 ORDER BY pi.created_at DESC, i.id DESC"
            ),
            params![project_id],
            map_row,
        )?;
        with_tags(conn, ideas)
    }

    /// The user's ideas not yet linked to `project_id`.
    pub fn list_available(conn: &Connection, user_id: i64, project_id: i64) -> Result<Vec<Idea>> {
        let ideas = query_all(
            conn,
            &format!(
                "SELECT {COLUMNS} FROM ideas i
                 WHERE i.user_id = ?1
                   AND NOT EXISTS (SELECT 1 FROM project_ideas pi
                                   WHERE pi.idea_id = i.id AND pi.project_id = ?2)
                 ORDER BY i.created_at DESC, i.id DESC"
            ),
            params![user_id, project_id],
            map_row,
        )?;
        with_tags(conn, ideas)
    }

    /// Link an idea to a project. An existing link yields a conflict.
    pub fn link(conn: &Connection, project_id: i64, idea_id: i64, now: DateTime<Utc>) -> Result<()> {
        let _ = conn
            .execute(
                "INSERT INTO project_ideas (project_id, idea_id, created_at) VALUES (?1, ?2, ?3)",
                params![project_id, idea_id, now],
            )
            .map_err(|e| StoreError::on_conflict(e, "Idea is already linked to this project"))?;
        Ok(())
    }

    /// Remove a link. Returns whether it existed.
    pub fn unlink(conn: &Connection, project_id: i64, idea_id: i64) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM project_ideas WHERE project_id = ?1 AND idea_id = ?2",
            params![project_id, idea_id],
        )?;
        Ok(changed > 0)
    }
}

/// Tag repository.
pub struct TagRepo;

impl TagRepo {
    /// Every tag, ordered by name.
    pub fn list_all(conn: &Connection) -> Result<Vec<Tag>> {
        query_all(conn, "SELECT id, name FROM tags ORDER BY name", [], map_tag)
    }

    /// Find a tag by name, creating it if missing.
    pub fn ensure(conn: &Connection, name: &str) -> Result<Tag> {
        let existing = conn
            .query_row(
                "SELECT id FROM tags WHERE name = ?1",
                params![name],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        let id = match existing {
            Some(id) => id,
            None => {
                let _ = conn.execute("INSERT INTO tags (name) VALUES (?1)", params![name])?;
                conn.last_insert_rowid()
            }
        };
        Ok(Tag {
            id,
            name: name.to_owned(),
        })
    }
}

fn replace_tags(conn: &Connection, idea_id: i64, tags: &[String]) -> Result<()> {
    for name in normalize_tags(tags) {
        let tag = TagRepo::ensure(conn, &name)?;
        let _ = conn.execute(
            "INSERT OR IGNORE INTO idea_tags (idea_id, tag_id) VALUES (?1, ?2)",
            params![idea_id, tag.id],
        )?;
    }
    Ok(())
}

fn tags_of(conn: &Connection, idea_id: i64) -> Result<Vec<Tag>> {
    query_all(
        conn,
        "SELECT t.id, t.name FROM tags t JOIN idea_tags it ON it.tag_id = t.id
         WHERE it.idea_id = ?1 ORDER BY t.name",
        params![idea_id],
        map_tag,
    )
}

fn with_tags(conn: &Connection, mut ideas: Vec<Idea>) -> Result<Vec<Idea>> {
    for idea in &mut ideas {
        idea.tags = tags_of(conn, idea.id)?;
    }
    Ok(ideas)
}

fn map_row(row: &Row<'_>) -> Result<Idea> {
    Ok(Idea {
        id: get(row, 0, "ideas", "id")?,
        user_id: get(row, 1, "ideas", "user_id")?,
        title: get(row, 2, "ideas", "title")?,
        description: get(row, 3, "ideas", "description")?,
        status: get_enum(row, 4, "ideas", "status")?,
        tags: Vec::new(),
        created_at: get(row, 5, "ideas", "created_at")?,
        updated_at: get(row, 6, "ideas", "updated_at")?,
    })
}

fn map_tag(row: &Row<'_>) -> Result<Tag> {
    Ok(Tag {
        id: get(row, 0, "tags", "id")?,
        name: get(row, 1, "tags", "name")?,
    })
}
