//! Task repository: CRUD, filtered listing, and statistics for `tasks`.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, Row, params};

use ipms_core::models::{Task, TaskCreate, TaskFilter, TaskStats};
use ipms_core::{SortOrder, TaskPriority, TaskSortField, TaskStatus};

use crate::errors::{Result, StoreError};
use crate::row_helpers::{
    Conditions, contains_pattern, get, get_enum, query_all, query_opt, time_value,
};

const COLUMNS: &str = "id, user_id, project_id, title, description, status, priority,
                       due_date, completed_at, created_at, updated_at";

/// Window for the `upcoming` statistic.
const UPCOMING_DAYS: i64 = 7;

/// Task repository. Stateless; every method takes a `&Connection`.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a task owned by `user_id`.
    pub fn create(
        conn: &Connection,
        user_id: i64,
        payload: &TaskCreate,
        now: DateTime<Utc>,
    ) -> Result<Task> {
        let completed_at = (payload.status == TaskStatus::Done).then_some(now);
        let _ = conn.execute(
            "INSERT INTO tasks (user_id, project_id, title, description, status, priority,
                                due_date, completed_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                user_id,
                payload.project_id,
                payload.title,
                payload.description,
                payload.status.as_str(),
                payload.priority.as_str(),
                payload.due_date,
                completed_at,
                now
            ],
        )?;
        Self::get(conn, conn.last_insert_rowid(), user_id)?.ok_or(StoreError::NotFound("Task"))
    }

    /// Get a task owned by `user_id`.
    pub fn get(conn: &Connection, id: i64, user_id: i64) -> Result<Option<Task>> {
        query_opt(
            conn,
            &format!("SELECT {COLUMNS} FROM tasks WHERE id = ?1 AND user_id = ?2"),
            params![id, user_id],
            map_row,
        )
    }

    /// The user's tasks, filtered and sorted. Newest first unless `sort_by` is set.
    pub fn list(conn: &Connection, user_id: i64, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut cond = Conditions::new("user_id = ?", user_id);
        cond.push_opt("status = ?", filter.status.map(|s| s.as_str().to_owned()));
        cond.push_opt("priority = ?", filter.priority.map(|p| p.as_str().to_owned()));
        cond.push_opt("due_date >= ?", filter.due_date_from.map(time_value));
        cond.push_opt("due_date <= ?", filter.due_date_to.map(time_value));
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = contains_pattern(search.trim());
            cond.push(
                "(title LIKE ? ESCAPE '\\' OR description LIKE ? ESCAPE '\\')",
                pattern,
            );
        }

        let order_by = match filter.sort_by {
            None => "created_at DESC, id DESC".to_owned(),
            Some(field) => {
                let order = filter.sort_order.unwrap_or(SortOrder::Asc).sql();
                format!("{} {order}, id {order}", sort_expr(field))
            }
        };

        let sql = format!(
            "SELECT {COLUMNS} FROM tasks WHERE {} ORDER BY {order_by}",
            cond.sql()
        );
        query_all(conn, &sql, cond.params(), map_row)
    }

    /// Every task in a project, regardless of owner.
    pub fn list_by_project(conn: &Connection, project_id: i64) -> Result<Vec<Task>> {
        query_all(
            conn,
            &format!(
                "SELECT {COLUMNS} FROM tasks WHERE project_id = ?1
                 ORDER BY created_at DESC, id DESC"
            ),
            params![project_id],
            map_row,
        )
    }

    /// Persist every mutable field of `task`.
    pub fn save(conn: &Connection, task: &Task) -> Result<()> {
        let changed = conn.execute(
            "UPDATE tasks
             SET project_id = ?3, title = ?4, description = ?5, status = ?6, priority = ?7,
                 due_date = ?8, completed_at = ?9, updated_at = ?10
             WHERE id = ?1 AND user_id = ?2",
            params![
                task.id,
                task.user_id,
                task.project_id,
                task.title,
                task.description,
                task.status.as_str(),
                task.priority.as_str(),
                task.due_date,
                task.completed_at,
                task.updated_at
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound("Task"));
        }
        Ok(())
    }

    /// Delete a task owned by `user_id`. Returns whether it existed.
    pub fn delete(conn: &Connection, id: i64, user_id: i64) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(changed > 0)
    }

    /// Aggregate counts over the user's tasks as of `now`.
    pub fn stats(conn: &Connection, user_id: i64, now: DateTime<Utc>) -> Result<TaskStats> {
        let mut stats = TaskStats::zeroed();

        let mut stmt = conn.prepare(
            "SELECT status, priority, COUNT(*) FROM tasks WHERE user_id = ?1
             GROUP BY status, priority",
        )?;
        let mut rows = stmt.query(params![user_id])?;
        while let Some(row) = rows.next()? {
            let status: TaskStatus = get_enum(row, 0, "tasks", "status")?;
            let priority: TaskPriority = get_enum(row, 1, "tasks", "priority")?;
            let count: i64 = get(row, 2, "tasks", "count")?;
            let count = u64::try_from(count).unwrap_or_default();
            stats.total += count;
            if status == TaskStatus::Done {
                stats.completed += count;
            }
            *stats.by_status.entry(status.as_str().to_owned()).or_default() += count;
            *stats.by_priority.entry(priority.as_str().to_owned()).or_default() += count;
        }

        let (overdue, upcoming): (i64, i64) = conn.query_row(
            "SELECT
                 COALESCE(SUM(due_date < ?2), 0),
                 COALESCE(SUM(due_date >= ?2 AND due_date <= ?3), 0)
             FROM tasks
             WHERE user_id = ?1 AND status != 'done' AND due_date IS NOT NULL",
            params![user_id, now, now + Duration::days(UPCOMING_DAYS)],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        stats.overdue = u64::try_from(overdue).unwrap_or_default();
        stats.upcoming = u64::try_from(upcoming).unwrap_or_default();

        Ok(stats.finish())
    }
}

/// ORDER BY expression for a sort field. Enum columns sort by rank, not text.
fn sort_expr(field: TaskSortField) -> &'static str {
    match field {
        TaskSortField::DueDate => "due_date",
        TaskSortField::CreatedAt => "created_at",
        TaskSortField::Priority => {
            "CASE priority WHEN 'low' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END"
        }
        TaskSortField::Status => {
            "CASE status WHEN 'todo' THEN 0 WHEN 'in_progress' THEN 1 ELSE 2 END"
        }
    }
}

fn map_row(row: &Row<'_>) -> Result<Task> {
    Ok(Task {
        id: get(row, 0, "tasks", "id")?,
        user_id: get(row, 1, "tasks", "user_id")?,
        project_id: get(row, 2, "tasks", "project_id")?,
        title: get(row, 3, "tasks", "title")?,
        description: get(row, 4, "tasks", "description")?,
        status: get_enum(row, 5, "tasks", "status")?,
        priority: get_enum(row, 6, "tasks", "priority")?,
        due_date: get(row, 7, "tasks", "due_date")?,
        completed_at: get(row, 8, "tasks", "completed_at")?,
        created_at: get(row, 9, "tasks", "created_at")?,
        updated_at: get(row, 10, "tasks", "updated_at")?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
