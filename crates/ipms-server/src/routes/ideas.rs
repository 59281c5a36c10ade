//! `/api/ideas`: the caller's ideas and the shared tag vocabulary.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use ipms_core::models::{AvailableIdeasQuery, Idea, IdeaCreate, IdeaFilter, IdeaUpdate, Tag};
use ipms_store::repositories::{IdeaRepo, TagRepo};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery, CurrentUser};
use crate::routes::{access, message};
use crate::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/tags", get(tags))
        .route("/available", get(available))
        .route("/{id}", get(show).put(update).delete(remove))
}

fn not_found() -> ApiError {
    ApiError::not_found("Idea not found")
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<IdeaCreate>,
) -> ApiResult<(StatusCode, Json<Idea>)> {
    payload.validate()?;
    let user_id = user.id();
    let idea = state
        .run_tx(move |conn| Ok(IdeaRepo::create(conn, user_id, &payload, Utc::now())?))
        .await?;
    Ok((StatusCode::CREATED, Json(idea)))
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(filter): ApiQuery<IdeaFilter>,
) -> ApiResult<Json<Vec<Idea>>> {
    let user_id = user.id();
    let ideas = state
        .run(move |conn| Ok(IdeaRepo::list(conn, user_id, &filter)?))
        .await?;
    Ok(Json(ideas))
}

async fn tags(State(state): State<AppState>, _user: CurrentUser) -> ApiResult<Json<Vec<Tag>>> {
    let tags = state.run(|conn| Ok(TagRepo::list_all(conn)?)).await?;
    Ok(Json(tags))
}

async fn available(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<AvailableIdeasQuery>,
) -> ApiResult<Json<Vec<Idea>>> {
    let user_id = user.id();
    let ideas = state
        .run(move |conn| {
            let project = access::readable(conn, query.project_id, user_id)?;
            Ok(IdeaRepo::list_available(conn, user_id, project.id)?)
        })
        .await?;
    Ok(Json(ideas))
}

async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Idea>> {
    let user_id = user.id();
    let idea = state
        .run(move |conn| IdeaRepo::get(conn, id, user_id)?.ok_or_else(not_found))
        .await?;
    Ok(Json(idea))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<IdeaUpdate>,
) -> ApiResult<Json<Idea>> {
    update.validate()?;
    let user_id = user.id();
    let idea = state
        .run_tx(move |conn| {
            let mut idea = IdeaRepo::get(conn, id, user_id)?.ok_or_else(not_found)?;
            idea.apply(&update);
            idea.updated_at = Utc::now();
            IdeaRepo::save(conn, &idea, update.tags.as_deref())?;
            IdeaRepo::get(conn, id, user_id)?.ok_or_else(not_found)
        })
        .await?;
    Ok(Json(idea))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    let user_id = user.id();
    let deleted = state
        .run(move |conn| Ok(IdeaRepo::delete(conn, id, user_id)?))
        .await?;
    if !deleted {
        return Err(not_found());
    }
    Ok(message("Idea deleted successfully"))
}
