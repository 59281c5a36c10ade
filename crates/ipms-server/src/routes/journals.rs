//! `/api/journals`: journals and their entries, scoped to the owner.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use ipms_core::models::{
    Journal, JournalCreate, JournalEntry, JournalEntryCreate, JournalEntryFilter,
    JournalEntryUpdate,
};
use ipms_store::Connection;
use ipms_store::repositories::{JournalEntryRepo, JournalRepo};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery, CurrentUser};
use crate::routes::message;
use crate::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(rename).delete(remove))
        .route("/{id}/entries", get(list_entries).post(create_entry))
        .route(
            "/{id}/entries/{entry_id}",
            get(show_entry).put(update_entry).delete(remove_entry),
        )
}

fn journal_not_found() -> ApiError {
    ApiError::not_found("Journal not found")
}

fn entry_not_found() -> ApiError {
    ApiError::not_found("Journal entry not found")
}

/// The journal if `user_id` owns it.
fn owned_journal(conn: &Connection, id: i64, user_id: i64) -> ApiResult<Journal> {
    JournalRepo::get(conn, id, user_id)?.ok_or_else(journal_not_found)
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<JournalCreate>,
) -> ApiResult<(StatusCode, Json<Journal>)> {
    payload.validate()?;
    let user_id = user.id();
    let journal = state
        .run(move |conn| Ok(JournalRepo::create(conn, user_id, &payload.title, Utc::now())?))
        .await?;
    Ok((StatusCode::CREATED, Json(journal)))
}

async fn list(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<Vec<Journal>>> {
    let user_id = user.id();
    let journals = state
        .run(move |conn| Ok(JournalRepo::list(conn, user_id)?))
        .await?;
    Ok(Json(journals))
}

async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Journal>> {
    let user_id = user.id();
    let journal = state
        .run(move |conn| owned_journal(conn, id, user_id))
        .await?;
    Ok(Json(journal))
}

async fn rename(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<JournalCreate>,
) -> ApiResult<Json<Journal>> {
    payload.validate()?;
    let user_id = user.id();
    let journal = state
        .run(move |conn| {
            JournalRepo::rename(conn, id, user_id, &payload.title, Utc::now())?
                .ok_or_else(journal_not_found)
        })
        .await?;
    Ok(Json(journal))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    let user_id = user.id();
    let deleted = state
        .run(move |conn| Ok(JournalRepo::delete(conn, id, user_id)?))
        .await?;
    if !deleted {
        return Err(journal_not_found());
    }
    Ok(message("Journal deleted successfully"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Entries
// ─────────────────────────────────────────────────────────────────────────────

async fn create_entry(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<JournalEntryCreate>,
) -> ApiResult<(StatusCode, Json<JournalEntry>)> {
    payload.validate()?;
    let user_id = user.id();
    let entry = state
        .run_tx(move |conn| {
            let journal = owned_journal(conn, id, user_id)?;
            Ok(JournalEntryRepo::create(conn, journal.id, user_id, &payload, Utc::now())?)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn list_entries(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(filter): ApiQuery<JournalEntryFilter>,
) -> ApiResult<Json<Vec<JournalEntry>>> {
    filter.validate()?;
    let user_id = user.id();
    let entries = state
        .run(move |conn| {
            let journal = owned_journal(conn, id, user_id)?;
            Ok(JournalEntryRepo::list(conn, journal.id, &filter)?)
        })
        .await?;
    Ok(Json(entries))
}

async fn show_entry(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath((id, entry_id)): ApiPath<(i64, i64)>,
) -> ApiResult<Json<JournalEntry>> {
    let user_id = user.id();
    let entry = state
        .run(move |conn| {
            let journal = owned_journal(conn, id, user_id)?;
            JournalEntryRepo::get(conn, journal.id, entry_id)?.ok_or_else(entry_not_found)
        })
        .await?;
    Ok(Json(entry))
}

async fn update_entry(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath((id, entry_id)): ApiPath<(i64, i64)>,
    ApiJson(update): ApiJson<JournalEntryUpdate>,
) -> ApiResult<Json<JournalEntry>> {
    update.validate()?;
    let user_id = user.id();
    let entry = state
        .run_tx(move |conn| {
            let journal = owned_journal(conn, id, user_id)?;
            let mut entry =
                JournalEntryRepo::get(conn, journal.id, entry_id)?.ok_or_else(entry_not_found)?;
            entry.apply(update);
            entry.updated_at = Utc::now();
            JournalEntryRepo::save(conn, &entry)?;
            Ok(entry)
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
            let journal = owned_journal(conn, id, user_id)?;
            if JournalEntryRepo::delete(conn, journal.id, entry_id)? {
                Ok(())
            } else {
                Err(entry_not_found())
            }
        })
        .await?;
    Ok(message("Journal entry deleted successfully"))
}
