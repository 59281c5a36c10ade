//! AI assistant facade settings.

use serde::{Deserialize, Serialize};

/// Model parameters reported by the assistant facade.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiSettings {
    /// Model name used until `/api/ai/initialize` selects another.
    pub default_model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Response length cap.
    pub max_tokens: u32,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            default_model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}
