//! Profile repository: one row per user, created on first read.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};

use ipms_core::models::{DEFAULT_NOTIFICATIONS, DEFAULT_THEME, DEFAULT_TIMEZONE, Profile};

use crate::errors::{Result, StoreError};
use crate::row_helpers::{get, query_opt};

const COLUMNS: &str = "id, user_id, full_name, bio, theme_preference, notification_preferences,
                       timezone, created_at, updated_at";

/// Profile repository.
pub struct ProfileRepo;

impl ProfileRepo {
    /// Get a user's profile.
    pub fn get(conn: &Connection, user_id: i64) -> Result<Option<Profile>> {
        query_opt(
            conn,
            &format!("SELECT {COLUMNS} FROM profiles WHERE user_id = ?1"),
            params![user_id],
            map_row,
        )
    }

    /// Get a user's profile, inserting one with default preferences if absent.
    pub fn get_or_create(conn: &Connection, user_id: i64, now: DateTime<Utc>) -> Result<Profile> {
        let _ = conn.execute(
            "INSERT OR IGNORE INTO profiles
                 (user_id, theme_preference, notification_preferences, timezone,
                  created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![user_id, DEFAULT_THEME, DEFAULT_NOTIFICATIONS, DEFAULT_TIMEZONE, now],
        )?;
        Self::get(conn, user_id)?.ok_or(StoreError::NotFound("Profile"))
    }

    /// Persist every mutable field of `profile`.
    pub fn save(conn: &Connection, profile: &Profile) -> Result<()> {
        let _ = conn.execute(
            "UPDATE profiles
             SET full_name = ?2, bio = ?3, theme_preference = ?4,
                 notification_preferences = ?5, timezone = ?6, updated_at = ?7
             WHERE id = ?1",
            params![
                profile.id,
                profile.full_name,
                profile.bio,
                profile.theme_preference,
                profile.notification_preferences,
                profile.timezone,
                profile.updated_at
            ],
        )?;
        Ok(())
    }
}

fn map_row(row: &Row<'_>) -> Result<Profile> {
    Ok(Profile {
        id: get(row, 0, "profiles", "id")?,
        user_id: get(row, 1, "profiles", "user_id")?,
        full_name: get(row, 2, "profiles", "full_name")?,
        bio: get(row, 3, "profiles", "bio")?,
        theme_preference: get(row, 4, "profiles", "theme_preference")?,
        notification_preferences: get(row, 5, "profiles", "notification_preferences")?,
        timezone: get(row, 6, "profiles", "timezone")?,
        created_at: get(row, 7, "profiles", "created_at")?,
        updated_at: get(row, 8, "profiles", "updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use ipms_core::models::ProfileUpdate;

    use super::*;
    use crate::repositories::test_support::{setup, user};

    #[test]
    fn get_or_create_is_idempotent() {
        let conn = setup();
        let u = user(&conn, "alice");
        let first = ProfileRepo::get_or_create(&conn, u.id, Utc::now()).unwrap();
        assert_eq!(first.theme_preference, "light");
        assert_eq!(first.notification_preferences, "all");
        assert_eq!(first.timezone, "UTC");
        let second = ProfileRepo::get_or_create(&conn, u.id, Utc::now()).unwrap();
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn save_persists_update() {
        let conn = setup();
        let u = user(&conn, "alice");
        let mut profile = ProfileRepo::get_or_create(&conn, u.id, Utc::now()).unwrap();
        profile.apply(ProfileUpdate {
            bio: Some(Some("Builder".into())),
            timezone: Some("Europe/Berlin".into()),
            ..ProfileUpdate::default()
        });
        ProfileRepo::save(&conn, &profile).unwrap();
        let loaded = ProfileRepo::get(&conn, u.id).unwrap().unwrap();
        assert_eq!(loaded.bio.as_deref(), Some("Builder"));
        assert_eq!(loaded.timezone, "Europe/Berlin");
        assert_eq!(loaded.theme_preference, "light");
    }
}
