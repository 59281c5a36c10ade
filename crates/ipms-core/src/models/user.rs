use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::patch;
use crate::validation::{self, ValidationResult};

/// A registered account.
///
/// The password hash and Google subject id never leave the server.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct User {
    /// Row id.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Display name.
    pub full_name: Option<String>,
    /// Argon2 PHC string. `None` for accounts created through Google sign-in.
    #[serde(skip)]
    pub hashed_password: Option<String>,
    /// Google account subject, once linked.
    #[serde(skip)]
    pub google_id: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Last successful sign-in.
    pub last_login: Option<DateTime<Utc>>,
}

/// Public subset of a user, used in listings and member rosters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// Row id.
    pub id: i64,
    /// Login name.
    pub username: String,
    /// Display name.
    pub full_name: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
        }
    }
}

/// Registration payload.
#[derive(Clone, Debug, Deserialize)]
pub struct UserCreate {
    /// Requested login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
    /// Display name.
    #[serde(default)]
    pub full_name: Option<String>,
}

impl UserCreate {
    /// Check username, email, and password rules.
    pub fn validate(&self) -> ValidationResult {
        validation::username(&self.username)?;
        validation::email(&self.email)?;
        validation::password(&self.password)
    }
}

/// Self-service account update.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UserUpdate {
    /// New email address.
    #[serde(default)]
    pub email: Option<String>,
    /// New display name; `null` clears it.
    #[serde(default, deserialize_with = "patch::double_option")]
    pub full_name: Option<Option<String>>,
    /// New plaintext password.
    #[serde(default)]
    pub password: Option<String>,
}

impl UserUpdate {
    /// Check whichever fields are present.
    pub fn validate(&self) -> ValidationResult {
        if let Some(email) = &self.email {
            validation::email(email)?;
        }
        if let Some(password) = &self.password {
            validation::password(password)?;
        }
        Ok(())
    }
}
