//! Activity repository: user activity records with JSON payloads.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};

use ipms_core::models::{Activity, ActivityCreate, ActivityFilter};

use crate::errors::{Result, StoreError};
use crate::row_helpers::{Conditions, get, get_json, query_all, query_opt, time_value};

const COLUMNS: &str = "id, user_id, project_id, type, data, timestamp";

/// Activity repository.
pub struct ActivityRepo;

impl ActivityRepo {
    /// Record an activity.
    pub fn create(
        conn: &Connection,
        user_id: i64,
        payload: &ActivityCreate,
        now: DateTime<Utc>,
    ) -> Result<Activity> {
        let _ = conn.execute(
            "INSERT INTO activities (user_id, project_id, type, data, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user_id,
                payload.project_id,
                payload.activity_type,
                serde_json::to_string(&payload.data)?,
                now
            ],
        )?;
        query_opt(
            conn,
            &format!("SELECT {COLUMNS} FROM activities WHERE id = ?1"),
            params![conn.last_insert_rowid()],
            map_row,
        )?
        .ok_or(StoreError::NotFound("Activity"))
    }

    /// The user's activities, newest first.
    pub fn list(conn: &Connection, user_id: i64, filter: &ActivityFilter) -> Result<Vec<Activity>> {
        let mut cond = Conditions::new("user_id = ?", user_id);
        cond.push_opt("type = ?", filter.activity_type.clone());
        cond.push_opt("timestamp >= ?", filter.from_date.map(time_value));
        cond.push_opt("timestamp <= ?", filter.to_date.map(time_value));
        let limit = cond.bind(filter.limit);
        let sql = format!(
            "SELECT {COLUMNS} FROM activities WHERE {}
             ORDER BY timestamp DESC, id DESC LIMIT {limit}",
            cond.sql()
        );
        query_all(conn, &sql, cond.params(), map_row)
    }

    /// Number of activities the user has recorded.
    pub fn count_for_user(conn: &Connection, user_id: i64) -> Result<u64> {
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM activities WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(n).unwrap_or_default())
    }
}

fn map_row(row: &Row<'_>) -> Result<Activity> {
    Ok(Activity {
        id: get(row, 0, "activities", "id")?,
        user_id: get(row, 1, "activities", "user_id")?,
        project_id: get(row, 2, "activities", "project_id")?,
        activity_type: get(row, 3, "activities", "type")?,
        data: get_json(row, 4, "activities", "data")?,
        timestamp: get(row, 5, "activities", "timestamp")?,
    })
}
