use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::patch;

/// Default UI theme for a fresh profile.
pub const DEFAULT_THEME: &str = "light";
/// Default notification setting for a fresh profile.
pub const DEFAULT_NOTIFICATIONS: &str = "all";
/// Default timezone for a fresh profile.
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Per-user preferences. Created lazily on first read.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Profile {
    /// Row id.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Display name.
    pub full_name: Option<String>,
    /// Free-form bio.
    pub bio: Option<String>,
    /// UI theme.
    pub theme_preference: String,
    /// Notification setting.
    pub notification_preferences: String,
    /// IANA timezone name.
    pub timezone: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Partial profile update.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    /// `null` clears.
    #[serde(default, deserialize_with = "patch::double_option")]
    pub full_name: Option<Option<String>>,
    /// `null` clears.
    #[serde(default, deserialize_with = "patch::double_option")]
    pub bio: Option<Option<String>>,
    /// UI theme.
    #[serde(default)]
    pub theme_preference: Option<String>,
    /// Notification setting.
    #[serde(default)]
    pub notification_preferences: Option<String>,
    /// Timezone.
    #[serde(default)]
    pub timezone: Option<String>,
}

impl Profile {
    /// Merge `update` into this profile.
    pub fn apply(&mut self, update: ProfileUpdate) {
        patch::apply(&mut self.full_name, update.full_name);
        patch::apply(&mut self.bio, update.bio);
        if let Some(theme) = update.theme_preference {
            self.theme_preference = theme;
        }
        if let Some(notifications) = update.notification_preferences {
            self.notification_preferences = notifications;
        }
        if let Some(timezone) = update.timezone {
            self.timezone = timezone;
        }
    }
}
