//! Pool handle with migrations applied and an async bridge.

use std::path::Path;

use rusqlite::Connection;
use tracing::info;

use crate::connection::{self, ConnectionConfig, ConnectionPool};
use crate::errors::{Result, StoreError};
use crate::migrations;

/// A migrated `SQLite` database behind an `r2d2` pool.
///
/// Cloning is cheap; clones share the pool.
#[derive(Clone)]
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    /// Open (creating if needed) the database file and apply migrations.
    pub fn open(path: &Path, config: &ConnectionConfig) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Self::from_pool(connection::new_file(path, config)?)?;
        info!(path = %path.display(), "database opened");
        Ok(db)
    }

    /// A fresh, migrated in-memory database.
    pub fn in_memory() -> Result<Self> {
        Self::from_pool(connection::new_in_memory(&ConnectionConfig::default())?)
    }

    /// Wrap an existing pool, applying pending migrations.
    pub fn from_pool(pool: ConnectionPool) -> Result<Self> {
        let conn = pool.get()?;
        let _ = migrations::run_migrations(&conn)?;
        drop(conn);
        Ok(Self { pool })
    }

    /// Run `f` with a pooled connection on the blocking thread pool.
    pub async fn call<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Internal(format!("blocking task failed: {e}")))?
    }

    /// Like [`call`](Self::call), but inside a transaction that commits when
    /// `f` succeeds and rolls back on any `Err`, including the caller's own
    /// error type `E`.
    pub async fn transaction<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Connection) -> std::result::Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> std::result::Result<T, E> {
            let conn = pool.get().map_err(StoreError::from)?;
            let tx = conn.unchecked_transaction().map_err(StoreError::from)?;
            let out = f(&tx)?;
            tx.commit().map_err(StoreError::from)?;
            Ok(out)
        })
        .await
        .map_err(|e| E::from(StoreError::Internal(format!("blocking task failed: {e}"))))?
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn in_memory_is_migrated() {
        let db = Database::in_memory().unwrap();
        let version = db.call(|conn| migrations::current_version(conn)).await.unwrap();
        assert_eq!(version, migrations::latest_version());
    }

    #[tokio::test]
    async fn calls_share_state() {
        let db = Database::in_memory().unwrap();
        db.call(|conn| {
            let _ = conn.execute(
                "INSERT INTO tags (name) VALUES ('shared')",
                [],
            )?;
            Ok(())
        })
        .await
        .unwrap();
        let count: i64 = db
            .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM tags", [], |r| r.get(0))?))
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn failed_transaction_rolls_back() {
        let db = Database::in_memory().unwrap();
        let result: Result<()> = db
            .transaction(|conn| {
                let _ = conn.execute("INSERT INTO tags (name) VALUES ('gone')", [])?;
                Err(StoreError::Internal("boom".into()))
            })
            .await;
        assert!(result.is_err());
        let count: i64 = db
            .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM tags", [], |r| r.get(0))?))
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[derive(Debug)]
    enum HandlerError {
        #[allow(dead_code)]
        Store(StoreError),
        Rejected,
    }

    impl From<StoreError> for HandlerError {
        fn from(err: StoreError) -> Self {
            Self::Store(err)
        }
    }

    #[tokio::test]
    async fn transaction_rolls_back_on_caller_error() {
        let db = Database::in_memory().unwrap();
        let rejected: std::result::Result<(), HandlerError> = db
            .transaction(|conn| {
                let _ = conn.execute("INSERT INTO tags (name) VALUES ('draft')", []).map_err(StoreError::from)?;
                Err(HandlerError::Rejected)
            })
            .await;
        assert_matches!(rejected, Err(HandlerError::Rejected));

        let kept: std::result::Result<(), HandlerError> = db
            .transaction(|conn| {
                let _ = conn.execute("INSERT INTO tags (name) VALUES ('kept')", []).map_err(StoreError::from)?;
                Ok(())
            })
            .await;
        assert_matches!(kept, Ok(()));

        let names: Vec<String> = db
            .call(|conn| {
                crate::row_helpers::query_all(conn, "SELECT name FROM tags", [], |row| {
                    crate::row_helpers::get(row, 0, "tags", "name")
                })
            })
            .await
            .unwrap();
        assert_eq!(names, vec!["kept"]);
    }

    #[test]
    fn open_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ipms.db");
        let _db = Database::open(&path, &ConnectionConfig::default()).unwrap();
        assert!(path.exists());
    }
}
