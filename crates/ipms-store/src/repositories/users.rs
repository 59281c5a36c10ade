//! User repository: CRUD for the `users` table.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};

use ipms_core::models::{User, UserSummary};

use crate::errors::{Result, StoreError};
use crate::row_helpers::{contains_pattern, get, query_all, query_opt};

const COLUMNS: &str = "id, username, email, full_name, hashed_password, google_id,
                       created_at, updated_at, last_login";

/// Fields for inserting a user.
#[derive(Debug)]
pub struct NewUser<'a> {
    /// Login name.
    pub username: &'a str,
    /// Email address.
    pub email: &'a str,
    /// Display name.
    pub full_name: Option<&'a str>,
    /// Argon2 PHC string, absent for Google-only accounts.
    pub hashed_password: Option<&'a str>,
    /// Google subject id.
    pub google_id: Option<&'a str>,
}

/// Stateless user repository.
pub struct UserRepo;

impl UserRepo {
    /// Insert a user. Duplicate username or email yields [`StoreError::Conflict`]
    /// with the message shown to API clients.
    pub fn create(conn: &Connection, user: &NewUser<'_>, now: DateTime<Utc>) -> Result<User> {
        if Self::get_by_username(conn, user.username)?.is_some() {
            return Err(StoreError::Conflict("Username already registered".into()));
        }
        if Self::get_by_email(conn, user.email)?.is_some() {
            return Err(StoreError::Conflict("Email already registered".into()));
        }

        let _ = conn
            .execute(
                "INSERT INTO users (username, email, full_name, hashed_password, google_id,
                                    created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                params![
                    user.username,
                    user.email,
                    user.full_name,
                    user.hashed_password,
                    user.google_id,
                    now
                ],
            )
            .map_err(|e| StoreError::on_conflict(e, "User already registered"))?;

        Self::get_by_id(conn, conn.last_insert_rowid())?.ok_or(StoreError::NotFound("User"))
    }

    /// Get a user by id.
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<User>> {
        query_opt(
            conn,
            &format!("SELECT {COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            map_row,
        )
    }

    /// Get a user by exact username.
    pub fn get_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
        query_opt(
            conn,
            &format!("SELECT {COLUMNS} FROM users WHERE username = ?1"),
            params![username],
            map_row,
        )
    }

    /// Get a user by email (case-insensitive).
    pub fn get_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
        query_opt(
            conn,
            &format!("SELECT {COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            map_row,
        )
    }

    /// Get a user by linked Google subject id.
    pub fn get_by_google_id(conn: &Connection, google_id: &str) -> Result<Option<User>> {
        query_opt(
            conn,
            &format!("SELECT {COLUMNS} FROM users WHERE google_id = ?1"),
            params![google_id],
            map_row,
        )
    }

    /// Whether `username` is taken.
    pub fn username_exists(conn: &Connection, username: &str) -> Result<bool> {
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE username = ?1",
            params![username],
            |row| row.get(0),
        )?;
        Ok(n > 0)
    }

    /// All users, ordered by username.
    pub fn list(conn: &Connection) -> Result<Vec<UserSummary>> {
        query_all(
            conn,
            "SELECT id, username, full_name FROM users ORDER BY username",
            [],
            map_summary,
        )
    }

    /// Users whose username, email, or full name contains `needle`.
    pub fn search(conn: &Connection, needle: &str, limit: u32) -> Result<Vec<UserSummary>> {
        query_all(
            conn,
            "SELECT id, username, full_name FROM users
             WHERE username LIKE ?1 ESCAPE '\\'
                OR email LIKE ?1 ESCAPE '\\'
                OR full_name LIKE ?1 ESCAPE '\\'
             ORDER BY username
             LIMIT ?2",
            params![contains_pattern(needle), limit],
            map_summary,
        )
    }

    /// Persist mutable fields of `user`. A taken email yields a conflict.
    pub fn save(conn: &Connection, user: &User) -> Result<()> {
        let changed = conn
            .execute(
                "UPDATE users
                 SET email = ?2, full_name = ?3, hashed_password = ?4, google_id = ?5,
                     updated_at = ?6, last_login = ?7
                 WHERE id = ?1",
                params![
                    user.id,
                    user.email,
                    user.full_name,
                    user.hashed_password,
                    user.google_id,
                    user.updated_at,
                    user.last_login
                ],
            )
            .map_err(|e| StoreError::on_conflict(e, "Email already registered"))?;
        if changed == 0 {
            return Err(StoreError::NotFound("User"));
        }
        Ok(())
    }

    /// Record a successful sign-in.
    pub fn touch_last_login(conn: &Connection, id: i64, now: DateTime<Utc>) -> Result<()> {
        let _ = conn.execute(
            "UPDATE users SET last_login = ?2 WHERE id = ?1",
            params![id, now],
        )?;
        Ok(())
    }

    /// Replace the password hash.
    pub fn set_password(conn: &Connection, id: i64, hash: &str, now: DateTime<Utc>) -> Result<()> {
        let _ = conn.execute(
            "UPDATE users SET hashed_password = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, hash, now],
        )?;
        Ok(())
    }
}

fn map_row(row: &Row<'_>) -> Result<User> {
    Ok(User {
        id: get(row, 0, "users", "id")?,
        username: get(row, 1, "users", "username")?,
        email: get(row, 2, "users", "email")?,
        full_name: get(row, 3, "users", "full_name")?,
        hashed_password: get(row, 4, "users", "hashed_password")?,
        google_id: get(row, 5, "users", "google_id")?,
        created_at: get(row, 6, "users", "created_at")?,
        updated_at: get(row, 7, "users", "updated_at")?,
        last_login: get(row, 8, "users", "last_login")?,
    })
}

fn map_summary(row: &Row<'_>) -> Result<UserSummary> {
    Ok(UserSummary {
        id: get(row, 0, "users", "id")?,
        username: get(row, 1, "users", "username")?,
        full_name: get(row, 2, "users", "full_name")?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::repositories::test_support::{setup, user};

    fn new_user<'a>(username: &'a str, email: &'a str) -> NewUser<'a> {
        NewUser {
            username,
            email,
            full_name: Some("Alice Example"),
            hashed_password: Some("hash"),
            google_id: None,
        }
    }

    #[test]
    fn create_and_get() {
        let conn = setup();
        let created = UserRepo::create(&conn, &new_user("alice", "alice@example.com"), Utc::now())
            .unwrap();
        assert!(created.id > 0);
        assert_eq!(created.full_name.as_deref(), Some("Alice Example"));
        assert!(created.last_login.is_none());

        let by_name = UserRepo::get_by_username(&conn, "alice").unwrap().unwrap();
        assert_eq!(by_name.id, created.id);
    }

    #[test]
    fn duplicate_username_conflicts() {
        let conn = setup();
        let _ = user(&conn, "alice");
        let err = UserRepo::create(&conn, &new_user("alice", "other@example.com"), Utc::now())
            .unwrap_err();
        assert_matches!(err, StoreError::Conflict(m) if m == "Username already registered");
    }

    #[test]
    fn duplicate_email_conflicts_case_insensitively() {
        let conn = setup();
        let _ = user(&conn, "alice");
        let err = UserRepo::create(&conn, &new_user("bob", "ALICE@example.com"), Utc::now())
            .unwrap_err();
        assert_matches!(err, StoreError::Conflict(m) if m == "Email already registered");
    }

    #[test]
    fn search_matches_any_field() {
        let conn = setup();
        let _ = user(&conn, "alice");
        let _ = user(&conn, "bob");
        let hits = UserRepo::search(&conn, "ALI", 20).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].username, "alice");

        let all = UserRepo::search(&conn, "example.com", 20).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn search_escapes_wildcards() {
        let conn = setup();
        let _ = user(&conn, "alice");
        assert!(UserRepo::search(&conn, "%", 20).unwrap().is_empty());
    }

    #[test]
    fn save_updates_fields() {
        let conn = setup();
        let mut u = user(&conn, "alice");
        u.full_name = Some("Alice A.".into());
        u.email = "new@example.com".into();
        UserRepo::save(&conn, &u).unwrap();
        let loaded = UserRepo::get_by_id(&conn, u.id).unwrap().unwrap();
        assert_eq!(loaded.email, "new@example.com");
        assert_eq!(loaded.full_name.as_deref(), Some("Alice A."));
    }

    #[test]
    fn save_email_conflict() {
        let conn = setup();
        let _ = user(&conn, "alice");
        let mut bob = user(&conn, "bob");
        bob.email = "alice@example.com".into();
        assert_matches!(UserRepo::save(&conn, &bob), Err(StoreError::Conflict(_)));
    }

    #[test]
    fn last_login_and_password() {
        let conn = setup();
        let u = user(&conn, "alice");
        let now = Utc::now();
        UserRepo::touch_last_login(&conn, u.id, now).unwrap();
        UserRepo::set_password(&conn, u.id, "new-hash", now).unwrap();
        let loaded = UserRepo::get_by_id(&conn, u.id).unwrap().unwrap();
        assert_eq!(loaded.last_login, Some(now));
        assert_eq!(loaded.hashed_password.as_deref(), Some("new-hash"));
    }

    #[test]
    fn list_ordered_by_username() {
        let conn = setup();
        let _ = user(&conn, "zoe");
        let _ = user(&conn, "adam");
        let names: Vec<_> = UserRepo::list(&conn)
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["adam", "zoe"]);
        assert!(UserRepo::username_exists(&conn, "zoe").unwrap());
        assert!(!UserRepo::username_exists(&conn, "yan").unwrap());
    }
}
