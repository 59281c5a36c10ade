//! `/api/users`: directory listing, search, and self-service updates.

use axum::extract::State;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::Utc;
use ipms_auth::hash_password;
use ipms_core::models::{User, UserSummary, UserUpdate};
use ipms_store::repositories::UserRepo;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery, CurrentUser};
use crate::state::AppState;

const SEARCH_LIMIT: u32 = 20;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/search", get(search))
        .route("/me", put(update_me))
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn list(State(state): State<AppState>, _user: CurrentUser) -> ApiResult<Json<Vec<UserSummary>>> {
    let users = state.run(|conn| Ok(UserRepo::list(conn)?)).await?;
    Ok(Json(users))
}

async fn search(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Json<Vec<UserSummary>>> {
    let needle = query.q.trim().to_owned();
    if needle.is_empty() {
        return Err(ApiError::bad_request("Search query must not be empty"));
    }
    let users = state
        .run(move |conn| Ok(UserRepo::search(conn, &needle, SEARCH_LIMIT)?))
        .await?;
    Ok(Json(users))
}

async fn update_me(
    State(state): State<AppState>,
    CurrentUser(mut user): CurrentUser,
    ApiJson(update): ApiJson<UserUpdate>,
) -> ApiResult<Json<User>> {
    update.validate()?;
    let user = state
        .run(move |conn| {
            if let Some(email) = update.email {
                user.email = email;
            }
            if let Some(full_name) = update.full_name {
                user.full_name = full_name;
            }
            if let Some(password) = update.password {
                user.hashed_password = Some(hash_password(&password)?);
            }
            user.updated_at = Utc::now();
            UserRepo::save(conn, &user)?;
            Ok(user)
        })
        .await?;
    Ok(Json(user))
}
