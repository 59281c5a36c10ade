use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{self, MAX_LABEL_LEN, ValidationResult};

/// A user activity record with an arbitrary JSON payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Activity {
    /// Row id.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Related project, if any.
    pub project_id: Option<i64>,
    /// Caller-defined activity kind.
    #[serde(rename = "type")]
    pub activity_type: String,
    /// Caller-defined payload, always a JSON object.
    pub data: serde_json::Value,
    /// When the activity was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Payload for recording an activity.
#[derive(Clone, Debug, Deserialize)]
pub struct ActivityCreate {
    /// Activity kind, 1 to 50 characters.
    #[serde(rename = "type")]
    pub activity_type: String,
    /// Payload object.
    #[serde(default = "empty_object")]
    pub data: serde_json::Value,
    /// Related project.
    #[serde(default)]
    pub project_id: Option<i64>,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl ActivityCreate {
    /// Check the type label and that `data` is an object.
    pub fn validate(&self) -> ValidationResult {
        validation::text("type", &self.activity_type, MAX_LABEL_LEN)?;
        validation::json_object("data", &self.data)
    }
}

/// Query parameters for listing activities.
#[derive(Clone, Debug, Deserialize)]
pub struct ActivityFilter {
    /// Only activities of this kind.
    #[serde(default, rename = "type")]
    pub activity_type: Option<String>,
    /// Recorded at or after.
    #[serde(default)]
    pub from_date: Option<DateTime<Utc>>,
    /// Recorded at or before.
    #[serde(default)]
    pub to_date: Option<DateTime<Utc>>,
    /// Page size, 1 to 100.
    #[serde(default = "super::default_feed_limit")]
    pub limit: u32,
}

impl Default for ActivityFilter {
    fn default() -> Self {
        Self {
            activity_type: None,
            from_date: None,
            to_date: None,
            limit: super::default_feed_limit(),
        }
    }
}

impl ActivityFilter {
    /// Check the page size.
    pub fn validate(&self) -> ValidationResult {
        validation::limit(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_uses_type_key() {
        let payload: ActivityCreate =
            serde_json::from_str(r#"{"type": "workout", "data": {"minutes": 30}}"#).unwrap();
        assert_eq!(payload.activity_type, "workout");
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn create_defaults_data_to_object() {
        let payload: ActivityCreate = serde_json::from_str(r#"{"type": "reading"}"#).unwrap();
        assert!(payload.data.is_object());
    }

    #[test]
    fn create_rejects_array_data() {
        let payload: ActivityCreate =
            serde_json::from_str(r#"{"type": "x", "data": [1, 2]}"#).unwrap();
        assert_eq!(payload.validate().unwrap_err().field, "data");
    }

    #[test]
    fn filter_limit_default() {
        assert_eq!(ActivityFilter::default().limit, 50);
        let f = ActivityFilter {
            limit: 500,
            ..ActivityFilter::default()
        };
        assert!(f.validate().is_err());
    }
}
