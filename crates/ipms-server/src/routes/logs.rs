//! `/api/logs`: work logs and their entries.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::Utc;
use ipms_core::models::{Log, LogCreate, LogEntry, LogEntryWrite, LogFilter, LogUpdate, Page};
use ipms_store::Connection;
use ipms_store::repositories::{LogEntryRepo, LogRepo};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery, CurrentUser};
use crate::routes::{access, message};
use crate::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(remove))
        .route("/{id}/entries", get(list_entries).post(create_entry))
        .route("/{id}/entries/{entry_id}", put(update_entry).delete(remove_entry))
}

fn log_not_found() -> ApiError {
    ApiError::not_found("Log not found")
}

fn entry_not_found() -> ApiError {
    ApiError::not_found("Log entry not found")
}

fn owned_log(conn: &Connection, id: i64, user_id: i64) -> ApiResult<Log> {
    LogRepo::get(conn, id, user_id)?.ok_or_else(log_not_found)
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<LogCreate>,
) -> ApiResult<(StatusCode, Json<Log>)> {
    payload.validate()?;
    let user_id = user.id();
    let log = state
        .run(move |conn| {
            access::check_optional(conn, payload.project_id, user_id)?;
            Ok(LogRepo::create(conn, user_id, &payload, Utc::now())?)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(log)))
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(filter): ApiQuery<LogFilter>,
) -> ApiResult<Json<Vec<Log>>> {
    filter.validate()?;
    let user_id = user.id();
    let logs = state
        .run(move |conn| Ok(LogRepo::list(conn, user_id, &filter)?))
        .await?;
    Ok(Json(logs))
}

async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Log>> {
    let user_id = user.id();
    let log = state.run(move |conn| owned_log(conn, id, user_id)).await?;
    Ok(Json(log))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<LogUpdate>,
) -> ApiResult<Json<Log>> {
    update.validate()?;
    let user_id = user.id();
    let log = state
        .run_tx(move |conn| {
            let mut log = owned_log(conn, id, user_id)?;
            if let Some(project_id) = update.project_id {
                access::check_optional(conn, project_id, user_id)?;
            }
            log.apply(update);
            log.updated_at = Utc::now();
            LogRepo::save(conn, &log)?;
            Ok(log)
        })
        .await?;
    Ok(Json(log))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    let user_id = user.id();
    let deleted = state
        .run(move |conn| Ok(LogRepo::delete(conn, id, user_id)?))
        .await?;
    if !deleted {
        return Err(log_not_found());
    }
    Ok(message("Log deleted successfully"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Entries
// ─────────────────────────────────────────────────────────────────────────────

async fn create_entry(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<LogEntryWrite>,
) -> ApiResult<(StatusCode, Json<LogEntry>)> {
    payload.validate()?;
    let user_id = user.id();
    let entry = state
        .run_tx(move |conn| {
            let log = owned_log(conn, id, user_id)?;
            Ok(LogEntryRepo::create(conn, log.id, user_id, &payload.content, Utc::now())?)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn list_entries(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(page): ApiQuery<Page>,
) -> ApiResult<Json<Vec<LogEntry>>> {
    page.validate()?;
    let user_id = user.id();
    let entries = state
        .run(move |conn| {
            let log = owned_log(conn, id, user_id)?;
            Ok(LogEntryRepo::list(conn, log.id, page)?)
        })
        .await?;
    Ok(Json(entries))
}

async fn update_entry(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath((id, entry_id)): ApiPath<(i64, i64)>,
    ApiJson(payload): ApiJson<LogEntryWrite>,
) -> ApiResult<Json<LogEntry>> {
    payload.validate()?;
    let user_id = user.id();
    let entry = state
        .run(move |conn| {
            let log = owned_log(conn, id, user_id)?;
            LogEntryRepo::update(conn, log.id, entry_id, &payload.content, Utc::now())?
                .ok_or_else(entry_not_found)
        })
        .await?;
    Ok(Json(entry))
}

async fn remove_entry(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath((id, entry_id)): ApiPath<(i64, i64)>,
) -> ApiResult<Json<Value>> {
    let user_id = user.id();
    state
        .run(move |conn| {
            let log = owned_log(conn, id, user_id)?;
            if LogEntryRepo::delete(conn, log.id, entry_id)? {
                Ok(())
            } else {
                Err(entry_not_found())
            }
        })
        .await?;
    Ok(message("Log entry deleted successfully"))
}
