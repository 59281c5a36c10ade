//! Refresh token and password reset repositories.
//!
//! Both tables store only a digest of the opaque token; the caller hashes
//! before every lookup. Consumption is a single `UPDATE ... RETURNING`, so a
//! token cannot be redeemed twice.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;

/// Refresh token repository.
pub struct RefreshTokenRepo;

impl RefreshTokenRepo {
    /// Store a newly issued token digest.
    pub fn insert(
        conn: &Connection,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO refresh_tokens (user_id, token_hash, expires_at, revoked, created_at)
             VALUES (?1, ?2, ?3, 0, ?4)",
            params![user_id, token_hash, expires_at, now],
        )?;
        Ok(())
    }

    /// Revoke an active token and return its owner, in one statement.
    ///
    /// Returns `None` for unknown, revoked, or expired tokens.
    pub fn consume(conn: &Connection, token_hash: &str, now: DateTime<Utc>) -> Result<Option<i64>> {
        let user_id = conn
            .query_row(
                "UPDATE refresh_tokens SET revoked = 1
                 WHERE token_hash = ?1 AND revoked = 0 AND expires_at > ?2
                 RETURNING user_id",
                params![token_hash, now],
                |row| row.get(0),
            )
            .optional()?;
        Ok(user_id)
    }

    /// Mark a token revoked. Returns whether the token exists at all.
    pub fn revoke(conn: &Connection, token_hash: &str) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE refresh_tokens SET revoked = 1 WHERE token_hash = ?1",
            params![token_hash],
        )?;
        Ok(changed > 0)
    }

    /// Revoke every token of a user. Returns how many were active.
    pub fn revoke_all_for_user(conn: &Connection, user_id: i64) -> Result<usize> {
        let changed = conn.execute(
            "UPDATE refresh_tokens SET revoked = 1 WHERE user_id = ?1 AND revoked = 0",
            params![user_id],
        )?;
        Ok(changed)
    }

    /// Delete expired and revoked rows. Returns how many were removed.
    pub fn purge(conn: &Connection, now: DateTime<Utc>) -> Result<usize> {
        let removed = conn.execute(
            "DELETE FROM refresh_tokens WHERE revoked = 1 OR expires_at <= ?1",
            params![now],
        )?;
        Ok(removed)
    }
}

/// Single-use password reset tokens.
pub struct PasswordResetRepo;

impl PasswordResetRepo {
    /// Store a newly issued reset token digest.
    pub fn insert(
        conn: &Connection,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO password_resets (user_id, token_hash, expires_at, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, token_hash, expires_at, now],
        )?;
        Ok(())
    }

    /// Mark an unused, unexpired reset as used and return its user.
    pub fn consume(conn: &Connection, token_hash: &str, now: DateTime<Utc>) -> Result<Option<i64>> {
        let user_id = conn
            .query_row(
                "UPDATE password_resets SET used_at = ?2
                 WHERE token_hash = ?1 AND used_at IS NULL AND expires_at > ?2
                 RETURNING user_id",
                params![token_hash, now],
                |row| row.get(0),
            )
            .optional()?;
        Ok(user_id)
    }
}
