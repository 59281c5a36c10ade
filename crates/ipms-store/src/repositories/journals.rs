//! Journal and journal entry repositories.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};

use ipms_core::models::{Journal, JournalEntry, JournalEntryCreate, JournalEntryFilter};

use crate::errors::{Result, StoreError};
use crate::row_helpers::{Conditions, get, get_json, query_all, query_opt, time_value};

const JOURNAL_COLUMNS: &str = "id, user_id, title, created_at, updated_at";
const ENTRY_COLUMNS: &str = "id, journal_id, user_id, content, mood, tags, created_at, updated_at";

/// Journal repository.
pub struct JournalRepo;

impl JournalRepo {
    /// Create a journal.
    pub fn create(conn: &Connection, user_id: i64, title: &str, now: DateTime<Utc>) -> Result<Journal> {
        let _ = conn.execute(
            "INSERT INTO journals (user_id, title, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            params![user_id, title, now],
        )?;
        Self::get(conn, conn.last_insert_rowid(), user_id)?.ok_or(StoreError::NotFound("Journal"))
    }

    /// Get a journal owned by `user_id`.
    pub fn get(conn: &Connection, id: i64, user_id: i64) -> Result<Option<Journal>> {
        query_opt(
            conn,
            &format!("SELECT {JOURNAL_COLUMNS} FROM journals WHERE id = ?1 AND user_id = ?2"),
            params![id, user_id],
            map_journal,
        )
    }

    /// The user's journals, most recently updated first.
    pub fn list(conn: &Connection, user_id: i64) -> Result<Vec<Journal>> {
        query_all(
            conn,
            &format!(
                "SELECT {JOURNAL_COLUMNS} FROM journals WHERE user_id = ?1
                 ORDER BY updated_at DESC, id DESC"
            ),
            params![user_id],
            map_journal,
        )
    }

    /// Rename a journal. Returns the updated row, or `None` if not owned.
    pub fn rename(
        conn: &Connection,
        id: i64,
        user_id: i64,
        title: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Journal>> {
        let changed = conn.execute(
            "UPDATE journals SET title = ?3, updated_at = ?4 WHERE id = ?1 AND user_id = ?2",
            params![id, user_id, title, now],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get(conn, id, user_id)
    }

    /// Delete a journal and its entries. Returns whether it existed.
    pub fn delete(conn: &Connection, id: i64, user_id: i64) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM journals WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(changed > 0)
    }
}

/// Journal entry repository.
pub struct JournalEntryRepo;

impl JournalEntryRepo {
    /// Write an entry into a journal.
    pub fn create(
        conn: &Connection,
        journal_id: i64,
        user_id: i64,
        payload: &JournalEntryCreate,
        now: DateTime<Utc>,
    ) -> Result<JournalEntry> {
        let _ = conn.execute(
            "INSERT INTO journal_entries (journal_id, user_id, content, mood, tags,
                                          created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                journal_id,
                user_id,
                payload.content,
                payload.mood,
                serde_json::to_string(&payload.tags)?,
                now
            ],
        )?;
        Self::get(conn, journal_id, conn.last_insert_rowid())?
            .ok_or(StoreError::NotFound("Journal entry"))
    }

    /// Get an entry of a journal.
    pub fn get(conn: &Connection, journal_id: i64, id: i64) -> Result<Option<JournalEntry>> {
        query_opt(
            conn,
            &format!(
                "SELECT {ENTRY_COLUMNS} FROM journal_entries WHERE id = ?1 AND journal_id = ?2"
            ),
            params![id, journal_id],
            map_entry,
        )
    }

    /// Entries of a journal, newest first.
    pub fn list(
        conn: &Connection,
        journal_id: i64,
        filter: &JournalEntryFilter,
    ) -> Result<Vec<JournalEntry>> {
        let mut cond = Conditions::new("journal_id = ?", journal_id);
        cond.push_opt("created_at >= ?", filter.from_date.map(time_value));
        cond.push_opt("created_at <= ?", filter.to_date.map(time_value));
        cond.push_opt("mood = ?", filter.mood.clone());
        cond.push_opt(
            "EXISTS (SELECT 1 FROM json_each(journal_entries.tags) WHERE json_each.value = ?)",
            filter.tag.clone(),
        );
        let limit = cond.bind(filter.limit);
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM journal_entries WHERE {}
             ORDER BY created_at DESC, id DESC LIMIT {limit}",
            cond.sql()
        );
        query_all(conn, &sql, cond.params(), map_entry)
    }

    /// Persist the mutable fields of `entry`.
    pub fn save(conn: &Connection, entry: &JournalEntry) -> Result<()> {
        let _ = conn.execute(
            "UPDATE journal_entries SET content = ?2, mood = ?3, tags = ?4, updated_at = ?5
             WHERE id = ?1",
            params![
                entry.id,
                entry.content,
                entry.mood,
                serde_json::to_string(&entry.tags)?,
                entry.updated_at
            ],
        )?;
        Ok(())
    }

    /// Delete an entry. Returns whether it existed.
    pub fn delete(conn: &Connection, journal_id: i64, id: i64) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM journal_entries WHERE id = ?1 AND journal_id = ?2",
            params![id, journal_id],
        )?;
        Ok(changed > 0)
    }

    /// Number of entries the user has written across all journals.
    pub fn count_for_user(conn: &Connection, user_id: i64) -> Result<u64> {
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM journal_entries WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(n).unwrap_or_default())
    }
}

fn map_journal(row: &Row<'_>) -> Result<Journal> {
    Ok(Journal {
        id: get(row, 0, "journals", "id")?,
        user_id: get(row, 1, "journals", "user_id")?,
        title: get(row, 2, "journals", "title")?,
        created_at: get(row, 3, "journals", "created_at")?,
        updated_at: get(row, 4, "journals", "updated_at")?,
    })
}

fn map_entry(row: &Row<'_>) -> Result<JournalEntry> {
    Ok(JournalEntry {
        id: get(row, 0, "journal_entries", "id")?,
        journal_id: get(row, 1, "journal_entries", "journal_id")?,
        user_id: get(row, 2, "journal_entries", "user_id")?,
        content: get(row, 3, "journal_entries", "content")?,
        mood: get(row, 4, "journal_entries", "mood")?,
        tags: get_json(row, 5, "journal_entries", "tags")?,
        created_at: get(row, 6, "journal_entries", "created_at")?,
        updated_at: get(row, 7, "journal_entries", "updated_at")?,
    })
}
