//! `/api/profile`: the caller's preferences.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use ipms_core::models::{Profile, ProfileUpdate};
use ipms_store::repositories::ProfileRepo;

use crate::error::ApiResult;
use crate::extract::{ApiJson, CurrentUser};
use crate::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(show).put(update))
}

async fn show(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<Profile>> {
    let user_id = user.id();
    let profile = state
        .run(move |conn| Ok(ProfileRepo::get_or_create(conn, user_id, Utc::now())?))
        .await?;
    Ok(Json(profile))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> ApiResult<Json<Profile>> {
    let user_id = user.id();
    let profile = state
        .run_tx(move |conn| {
            let now = Utc::now();
            let mut profile = ProfileRepo::get_or_create(conn, user_id, now)?;
            profile.apply(update);
            profile.updated_at = now;
            ProfileRepo::save(conn, &profile)?;
            Ok(profile)
        })
        .await?;
    Ok(Json(profile))
}
