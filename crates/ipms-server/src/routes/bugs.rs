//! `/api/bugs`: unauthenticated bug reports appended to a markdown file.

use std::path::Path;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tracing::{error, info};

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::routes::message;
use crate::state::AppState;

const FILE_HEADER: &str = "# Bug Reports\n";

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/report", post(report))
}

/// A user-submitted bug report.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BugReport {
    title: String,
    description: String,
    system_info: String,
    #[serde(default)]
    error_logs: Option<Vec<String>>,
}

impl BugReport {
    fn to_markdown(&self, reported_at: DateTime<Utc>) -> String {
        let logs = match &self.error_logs {
            Some(lines) if !lines.is_empty() => lines.join("\n"),
            _ => "No error logs provided".to_owned(),
        };
        format!(
            "\n## {title}\n**Reported at:** {at}\n\n### Description\n{description}\n\n\
             ### System Information\n```json\n{system}\n```\n\n\
             ### Error Logs\n```\n{logs}\n```\n\n---\n",
            title = self.title,
            at = reported_at.to_rfc3339(),
            description = self.description,
            system = self.system_info,
        )
    }
}

/// Append `section`, creating the file and its parent directory if missing.
async fn append(path: &Path, section: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let fresh = !tokio::fs::try_exists(path).await?;
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    if fresh {
        file.write_all(FILE_HEADER.as_bytes()).await?;
    }
    file.write_all(section.as_bytes()).await?;
    file.flush().await
}

async fn report(
    State(state): State<AppState>,
    ApiJson(report): ApiJson<BugReport>,
) -> ApiResult<Json<Value>> {
    if report.title.trim().is_empty() {
        return Err(ApiError::bad_request("title: must not be empty"));
    }
    let path = state.bug_reports_path();
    let section = report.to_markdown(Utc::now());
    append(&path, &section).await.map_err(|e| {
        error!(path = %path.display(), error = %e, "failed to write bug report");
        ApiError::Internal("Failed to save bug report".to_owned())
    })?;
    info!(title = %report.title, "bug report recorded");
    Ok(message("Bug report successfully submitted"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(logs: Option<Vec<String>>) -> BugReport {
        BugReport {
            title: "Crash on save".into(),
            description: "Saving a task crashes".into(),
            system_info: "{\"os\":\"linux\"}".into(),
            error_logs: logs,
        }
    }

    #[test]
    fn markdown_without_logs_uses_placeholder() {
        let md = sample(None).to_markdown(Utc::now());
        assert!(md.starts_with("\n## Crash on save\n**Reported at:** "));
        assert!(md.contains("### Description\nSaving a task crashes\n"));
        assert!(md.contains("```json\n{\"os\":\"linux\"}\n```"));
        assert!(md.contains("```\nNo error logs provided\n```"));
        assert!(md.ends_with("\n---\n"));
    }

    #[test]
    fn markdown_joins_log_lines() {
        let md = sample(Some(vec!["first".into(), "second".into()])).to_markdown(Utc::now());
        assert!(md.contains("```\nfirst\nsecond\n```"));
    }

    #[test]
    fn deserializes_camel_case_keys() {
        let report: BugReport = serde_json::from_str(
            r#"{"title":"t","description":"d","systemInfo":"s","errorLogs":["e"]}"#,
        )
        .unwrap();
        assert_eq!(report.system_info, "s");
        assert_eq!(report.error_logs.as_deref(), Some(&["e".to_owned()][..]));
    }

    #[tokio::test]
    async fn append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("BUGS.md");
        append(&path, "\n## one\n").await.unwrap();
        append(&path, "\n## two\n").await.unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "# Bug Reports\n\n## one\n\n## two\n");
    }
}
