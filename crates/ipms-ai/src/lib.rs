//! # ipms-ai
//!
//! The assistant behind `/api/ai`.
//!
//! [`Assistant`] is the seam the server talks to. [`PlaceholderAssistant`]
//! answers every call with fixed values; only the model name is mutable.

#![deny(unsafe_code)]

use std::sync::Arc;

use async_trait::async_trait;
use ipms_core::TaskPriority;
use ipms_core::models::Task;
use ipms_settings::AiSettings;
use parking_lot::RwLock;
use serde::Serialize;

/// Sentiment analysis result.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sentiment {
    /// Label such as `"neutral"`.
    pub sentiment: String,
    /// Score in `-1.0..=1.0`.
    pub score: f64,
}

/// Assessment of a task described by title and description.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskAnalysis {
    /// Suggested priority.
    pub priority: TaskPriority,
    /// Effort estimate in hours.
    pub estimated_hours: f64,
    /// Suggested tags.
    pub tags: Vec<String>,
    /// Free-text complexity notes.
    pub complexity_analysis: String,
    /// Risks worth planning for.
    pub potential_challenges: Vec<String>,
}

/// Current model configuration, as reported by `/api/ai/status`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelStatus {
    /// Model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Response token cap.
    pub max_tokens: u32,
}

/// Operations the AI endpoints delegate to.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Switch to `model`, or keep the current one when `None`.
    fn initialize(&self, model: Option<&str>);

    /// Current model configuration.
    fn status(&self) -> ModelStatus;

    /// Free-form completion.
    async fn generate(&self, prompt: &str, context_types: &[String], max_length: Option<u32>) -> String;

    /// Sentiment of a journal entry.
    async fn analyze_sentiment(&self, text: &str) -> Sentiment;

    /// Goal ideas derived from arbitrary user data.
    async fn suggest_goals(&self, user_data: &serde_json::Value) -> Vec<String>;

    /// Category label for an activity payload.
    async fn categorize_activity(&self, activity: &serde_json::Value) -> String;

    /// Assess a task that may not exist yet.
    async fn analyze_task(&self, title: &str, description: &str) -> TaskAnalysis;

    /// Suggestions for getting a task done.
    async fn optimize_task(&self, task: &Task) -> Vec<String>;
}

/// Shared assistant handle.
pub type SharedAssistant = Arc<dyn Assistant>;

/// Assistant returning fixed responses.
#[derive(Debug)]
pub struct PlaceholderAssistant {
    model: RwLock<String>,
    temperature: f64,
    max_tokens: u32,
}

impl PlaceholderAssistant {
    /// Start from the configured default model.
    pub fn new(settings: &AiSettings) -> Self {
        Self {
            model: RwLock::new(settings.default_model.clone()),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }
}

#[async_trait]
impl Assistant for PlaceholderAssistant {
    fn initialize(&self, model: Option<&str>) {
        if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
            tracing::info!(model, "switching assistant model");
            *self.model.write() = model.to_owned();
        }
    }

    fn status(&self) -> ModelStatus {
        ModelStatus {
            model: self.model.read().clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    async fn generate(&self, _prompt: &str, _context_types: &[String], _max_length: Option<u32>) -> String {
        "AI response placeholder".to_owned()
    }

    async fn analyze_sentiment(&self, _text: &str) -> Sentiment {
        Sentiment {
            sentiment: "neutral".to_owned(),
            score: 0.0,
        }
    }

    async fn suggest_goals(&self, _user_data: &serde_json::Value) -> Vec<String> {
        vec!["Goal suggestion 1".to_owned(), "Goal suggestion 2".to_owned()]
    }

    async fn categorize_activity(&self, _activity: &serde_json::Value) -> String {
        "activity_category".to_owned()
    }

    async fn analyze_task(&self, title: &str, description: &str) -> TaskAnalysis {
        let mut potential_challenges = Vec::new();
        if description.trim().is_empty() {
            potential_challenges.push("Scope is undefined without a description".to_owned());
        }
        TaskAnalysis {
            priority: TaskPriority::Medium,
            estimated_hours: 1.0,
            tags: Vec::new(),
            complexity_analysis: format!("No analysis available for \"{title}\""),
            potential_challenges,
        }
    }

    async fn optimize_task(&self, task: &Task) -> Vec<String> {
        let mut out = vec![format!("Break \"{}\" into smaller steps", task.title)];
        if task.due_date.is_none() {
            out.push("Set a due date".to_owned());
        }
        out
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
