//! `/api/activities`: the caller's activity feed.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use ipms_core::models::{Activity, ActivityCreate, ActivityFilter};
use ipms_store::repositories::ActivityRepo;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery, CurrentUser};
use crate::routes::access;
use crate::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(list).post(create))
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<ActivityCreate>,
) -> ApiResult<(StatusCode, Json<Activity>)> {
    payload.validate()?;
    let user_id = user.id();
    let activity = state
        .run(move |conn| {
            access::check_optional(conn, payload.project_id, user_id)?;
            Ok(ActivityRepo::create(conn, user_id, &payload, Utc::now())?)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(filter): ApiQuery<ActivityFilter>,
) -> ApiResult<Json<Vec<Activity>>> {
    filter.validate()?;
    let user_id = user.id();
    let activities = state
        .run(move |conn| Ok(ActivityRepo::list(conn, user_id, &filter)?))
        .await?;
    Ok(Json(activities))
}
