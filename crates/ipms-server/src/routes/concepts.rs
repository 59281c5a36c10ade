//! `/api/concepts`: concept notes attached to a project.
//!
//! Anyone with project access may read notes; only the author may change
//! or delete one.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use ipms_core::models::{ConceptNote, ConceptNoteCreate, ConceptNoteUpdate};
use ipms_store::Connection;
use ipms_store::repositories::ConceptNoteRepo;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, CurrentUser};
use crate::routes::access;
use crate::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/project/{project_id}", get(list_for_project))
        .route("/{id}", get(show).put(update).delete(remove))
}

/// The note if its project is readable by `user_id`.
fn readable_note(conn: &Connection, id: i64, user_id: i64) -> ApiResult<ConceptNote> {
    let note = ConceptNoteRepo::get(conn, id)?
        .ok_or_else(|| ApiError::not_found("Concept note not found"))?;
    let _ = access::readable(conn, note.project_id, user_id)?;
    Ok(note)
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<ConceptNoteCreate>,
) -> ApiResult<(StatusCode, Json<ConceptNote>)> {
    payload.validate()?;
    let user_id = user.id();
    let note = state
        .run(move |conn| {
            let _ = access::readable(conn, payload.project_id, user_id)?;
            Ok(ConceptNoteRepo::create(conn, user_id, &payload, Utc::now())?)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

async fn list_for_project(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(project_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<ConceptNote>>> {
    let user_id = user.id();
    let notes = state
        .run(move |conn| {
            let project = access::readable(conn, project_id, user_id)?;
            Ok(ConceptNoteRepo::list_by_project(conn, project.id)?)
        })
        .await?;
    Ok(Json(notes))
}

async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<ConceptNote>> {
    let user_id = user.id();
    let note = state
        .run(move |conn| readable_note(conn, id, user_id))
        .await?;
    Ok(Json(note))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<ConceptNoteUpdate>,
) -> ApiResult<Json<ConceptNote>> {
    update.validate()?;
    let user_id = user.id();
    let note = state
        .run_tx(move |conn| {
            let mut note = readable_note(conn, id, user_id)?;
            if note.user_id != user_id {
                return Err(ApiError::forbidden("Not authorized to update this concept note"));
            }
            note.apply(update);
            note.updated_at = Utc::now();
            ConceptNoteRepo::save(conn, &note)?;
            Ok(note)
        })
        .await?;
    Ok(Json(note))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    let user_id = user.id();
    state
        .run_tx(move |conn| {
            let note = readable_note(conn, id, user_id)?;
            if note.user_id != user_id {
                return Err(ApiError::forbidden("Not authorized to delete this concept note"));
            }
            let _ = ConceptNoteRepo::delete(conn, note.id)?;
            Ok(())
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
