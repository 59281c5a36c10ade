//! `/api/mindmaps`: free-form JSON mind maps attached to a project.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use ipms_core::models::{Mindmap, MindmapCreate, MindmapUpdate};
use ipms_store::Connection;
use ipms_store::repositories::MindmapRepo;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, CurrentUser};
use crate::routes::{access, message};
use crate::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}", get(show).put(update).delete(remove))
        .route("/projects/{project_id}/mindmaps", get(list_for_project))
}

fn accessible_map(conn: &Connection, id: i64, user_id: i64) -> ApiResult<Mindmap> {
    let map = MindmapRepo::get(conn, id)?.ok_or_else(|| ApiError::not_found("Mindmap not found"))?;
    let _ = access::readable(conn, map.project_id, user_id)?;
    Ok(map)
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<MindmapCreate>,
) -> ApiResult<(StatusCode, Json<Mindmap>)> {
    payload.validate()?;
    let user_id = user.id();
    let map = state
        .run(move |conn| {
            let _ = access::readable(conn, payload.project_id, user_id)?;
            Ok(MindmapRepo::create(conn, &payload, Utc::now())?)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(map)))
}

async fn list_for_project(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(project_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<Mindmap>>> {
    let user_id = user.id();
    let maps = state
        .run(move |conn| {
            let project = access::readable(conn, project_id, user_id)?;
            Ok(MindmapRepo::list_by_project(conn, project.id)?)
        })
        .await?;
    Ok(Json(maps))
}

async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Mindmap>> {
    let user_id = user.id();
    let map = state
        .run(move |conn| accessible_map(conn, id, user_id))
        .await?;
    Ok(Json(map))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<MindmapUpdate>,
) -> ApiResult<Json<Mindmap>> {
    update.validate()?;
    let user_id = user.id();
    let map = state
        .run_tx(move |conn| {
            let mut map = accessible_map(conn, id, user_id)?;
            map.apply(update);
            map.updated_at = Utc::now();
            MindmapRepo::save(conn, &map)?;
            Ok(map)
        })
        .await?;
    Ok(Json(map))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    let user_id = user.id();
    state
        .run_tx(move |conn| {
            let map = accessible_map(conn, id, user_id)?;
            let _ = MindmapRepo::delete(conn, map.id)?;
            Ok(())
        })
        .await?;
    Ok(message("Mindmap deleted successfully"))
}
