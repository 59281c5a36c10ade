//! Log and log entry repositories.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};

use ipms_core::models::{Log, LogCreate, LogEntry, LogFilter, Page};

use crate::errors::{Result, StoreError};
use crate::row_helpers::{Conditions, get, get_enum, query_all, query_opt};

const LOG_COLUMNS: &str = "id, user_id, project_id, title, content, log_type, created_at, updated_at";
const ENTRY_COLUMNS: &str = "id, log_id, user_id, content, created_at, updated_at";

/// Log repository.
pub struct LogRepo;

impl LogRepo {
    /// Create a log owned by `user_id`.
    pub fn create(conn: &Connection, user_id: i64, payload: &LogCreate, now: DateTime<Utc>) -> Result<Log> {
        let _ = conn.execute(
            "INSERT INTO logs (user_id, project_id, title, content, log_type, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                user_id,
                payload.project_id,
                payload.title,
                payload.content,
                payload.log_type.as_str(),
                now
            ],
        )?;
        Self::get(conn, conn.last_insert_rowid(), user_id)?.ok_or(StoreError::NotFound("Log"))
    }

    /// Get a log owned by `user_id`.
    pub fn get(conn: &Connection, id: i64, user_id: i64) -> Result<Option<Log>> {
        query_opt(
            conn,
            &format!("SELECT {LOG_COLUMNS} FROM logs WHERE id = ?1 AND user_id = ?2"),
            params![id, user_id],
            map_log,
        )
    }

    /// The user's logs, newest first.
    pub fn list(conn: &Connection, user_id: i64, filter: &LogFilter) -> Result<Vec<Log>> {
        let mut cond = Conditions::new("user_id = ?", user_id);
        cond.push_opt("project_id = ?", filter.project_id);
        cond.push_opt("log_type = ?", filter.log_type.map(|t| t.as_str().to_owned()));
        let limit = cond.bind(filter.limit);
        let offset = cond.bind(filter.skip);
        let sql = format!(
            "SELECT {LOG_COLUMNS} FROM logs WHERE {}
             ORDER BY created_at DESC, id DESC LIMIT {limit} OFFSET {offset}",
            cond.sql()
        );
        query_all(conn, &sql, cond.params(), map_log)
    }

    /// Every log attached to a project, regardless of author.
    pub fn list_by_project(conn: &Connection, project_id: i64) -> Result<Vec<Log>> {
        query_all(
            conn,
            &format!(
                "SELECT {LOG_COLUMNS} FROM logs WHERE project_id = ?1
                 ORDER BY created_at DESC, id DESC"
            ),
            params![project_id],
            map_log,
        )
    }

    /// Persist the mutable fields of `log`.
    pub fn save(conn: &Connection, log: &Log) -> Result<()> {
        let _ = conn.execute(
            "UPDATE logs SET project_id = ?2, title = ?3, content = ?4, log_type = ?5,
                             updated_at = ?6
             WHERE id = ?1",
            params![
                log.id,
                log.project_id,
                log.title,
                log.content,
                log.log_type.as_str(),
                log.updated_at
            ],
        )?;
        Ok(())
    }

    /// Delete a log and its entries. Returns whether it existed.
    pub fn delete(conn: &Connection, id: i64, user_id: i64) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM logs WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(changed > 0)
    }
}

/// Log entry repository.
pub struct LogEntryRepo;

impl LogEntryRepo {
    /// Append an entry to a log.
    pub fn create(
        conn: &Connection,
        log_id: i64,
        user_id: i64,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<LogEntry> {
        let _ = conn.execute(
            "INSERT INTO log_entries (log_id, user_id, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![log_id, user_id, content, now],
        )?;
        Self::get(conn, log_id, conn.last_insert_rowid())?.ok_or(StoreError::NotFound("Log entry"))
    }

    /// Get an entry of a log.
    pub fn get(conn: &Connection, log_id: i64, id: i64) -> Result<Option<LogEntry>> {
        query_opt(
            conn,
            &format!("SELECT {ENTRY_COLUMNS} FROM log_entries WHERE id = ?1 AND log_id = ?2"),
            params![id, log_id],
            map_entry,
        )
    }

    /// Entries of a log, newest first.
    pub fn list(conn: &Connection, log_id: i64, page: Page) -> Result<Vec<LogEntry>> {
        query_all(
            conn,
            &format!(
                "SELECT {ENTRY_COLUMNS} FROM log_entries WHERE log_id = ?1
                 ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3"
            ),
            params![log_id, page.limit, page.skip],
            map_entry,
        )
    }

    /// Replace an entry's content. Returns the updated row, or `None` if absent.
    pub fn update(
        conn: &Connection,
        log_id: i64,
        id: i64,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<LogEntry>> {
        let changed = conn.execute(
            "UPDATE log_entries SET content = ?3, updated_at = ?4 WHERE id = ?1 AND log_id = ?2",
            params![id, log_id, content, now],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get(conn, log_id, id)
    }

    /// Delete an entry. Returns whether it existed.
    pub fn delete(conn: &Connection, log_id: i64, id: i64) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM log_entries WHERE id = ?1 AND log_id = ?2",
            params![id, log_id],
        )?;
        Ok(changed > 0)
    }
}

fn map_log(row: &Row<'_>) -> Result<Log> {
    Ok(Log {
        id: get(row, 0, "logs", "id")?,
        user_id: get(row, 1, "logs", "user_id")?,
        project_id: get(row, 2, "logs", "project_id")?,
        title: get(row, 3, "logs", "title")?,
        content: get(row, 4, "logs", "content")?,
        log_type: get_enum(row, 5, "logs", "log_type")?,
        created_at: get(row, 6, "logs", "created_at")?,
        updated_at: get(row, 7, "logs", "updated_at")?,
    })
}

fn map_entry(row: &Row<'_>) -> Result<LogEntry> {
    Ok(LogEntry {
        id: get(row, 0, "log_entries", "id")?,
        log_id: get(row, 1, "log_entries", "log_id")?,
        user_id: get(row, 2, "log_entries", "user_id")?,
        content: get(row, 3, "log_entries", "content")?,
        created_at: get(row, 4, "log_entries", "created_at")?,
        updated_at: get(row, 5, "log_entries", "updated_at")?,
    })
}
