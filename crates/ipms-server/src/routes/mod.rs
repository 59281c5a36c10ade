//! Route tables, one module per resource.

use axum::Router;

use crate::state::AppState;

pub mod access;
pub mod activities;
pub mod ai;
pub mod auth;
pub mod bugs;
pub mod concepts;
pub mod ideas;
pub mod journals;
pub mod logs;
pub mod mindmaps;
pub mod profile;
pub mod projects;
pub mod root;
pub mod tasks;
pub mod users;

/// Every route, unlayered.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(root::router())
        .nest("/api/auth", auth::router())
        .nest("/api/users", users::router())
        .nest("/api/profile", profile::router())
        .nest("/api/tasks", tasks::router())
        .nest("/api/projects", projects::router())
        .nest("/api/activities", activities::router())
        .nest("/api/journals", journals::router())
        .nest("/api/logs", logs::router())
        .nest("/api/ideas", ideas::router())
        .nest("/api/concepts", concepts::router())
        .nest("/api/mindmaps", mindmaps::router())
        .nest("/api/bugs", bugs::router())
        .nest("/api/ai", ai::router())
}

/// `{"message": ...}` body.
pub(crate) fn message(text: impl Into<String>) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "message": text.into() }))
}
