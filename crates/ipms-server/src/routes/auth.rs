//! `/api/auth`: registration, login, token rotation, password reset, Google.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Duration, Utc};
use ipms_auth::google::username_base;
use ipms_auth::{AuthError, TokenPair, digest, generate_token, hash_password, verify_password};
use ipms_core::models::{User, UserCreate};
use ipms_core::validation;
use ipms_store::Connection;
use ipms_store::repositories::{NewUser, PasswordResetRepo, RefreshTokenRepo, UserRepo};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::extract::{ACCESS_COOKIE, ApiJson, CurrentUser};
use crate::routes::message;
use crate::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/token", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/profile", get(me))
        .route("/password-reset/request", post(request_reset))
        .route("/password-reset/verify", post(verify_reset))
        .route("/google", post(google))
}

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct RefreshRequest {
    refresh_token: String,
}

#[derive(Deserialize)]
struct ResetRequest {
    email: String,
}

#[derive(Serialize)]
struct ResetIssued {
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ResetVerify {
    token: String,
    new_password: String,
}

#[derive(Deserialize)]
struct GoogleLogin {
    code: String,
    #[serde(default)]
    redirect_uri: Option<String>,
}

/// Response carrying a token pair and the access cookie.
type TokenResponse = (CookieJar, Json<TokenPair>);

fn with_cookie(state: &AppState, jar: CookieJar, tokens: TokenPair) -> TokenResponse {
    let cookie = Cookie::build((ACCESS_COOKIE, format!("Bearer {}", tokens.access_token)))
        .http_only(true)
        .secure(state.settings.auth.cookie_secure)
        .same_site(SameSite::Lax)
        .path("/");
    (jar.add(cookie), Json(tokens))
}

async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(payload): ApiJson<UserCreate>,
) -> ApiResult<TokenResponse> {
    payload.validate()?;
    let st = state.clone();
    let tokens = state
        .run_tx(move |conn| {
            let hash = hash_password(&payload.password)?;
            let now = Utc::now();
            let user = UserRepo::create(
                conn,
                &NewUser {
                    username: &payload.username,
                    email: &payload.email,
                    full_name: payload.full_name.as_deref(),
                    hashed_password: Some(&hash),
                    google_id: None,
                },
                now,
            )?;
            info!(user_id = user.id, username = %user.username, "user registered");
            st.issue_tokens(conn, &user, now)
        })
        .await?;
    Ok(with_cookie(&state, jar, tokens))
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<TokenResponse> {
    let st = state.clone();
    let tokens = state
        .run_tx(move |conn| {
            let user = UserRepo::get_by_username(conn, &payload.username)?;
            let verified = user.filter(|u| {
                u.hashed_password
                    .as_deref()
                    .is_some_and(|hash| verify_password(&payload.password, hash))
            });
            let Some(user) = verified else {
                warn!(username = %payload.username, "login failed");
                return Err(AuthError::InvalidCredentials.into());
            };
            let now = Utc::now();
            UserRepo::touch_last_login(conn, user.id, now)?;
            info!(user_id = user.id, "login succeeded");
            st.issue_tokens(conn, &user, now)
        })
        .await?;
    Ok(with_cookie(&state, jar, tokens))
}

async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> ApiResult<TokenResponse> {
    let st = state.clone();
    let tokens = state
        .run_tx(move |conn| {
            let now = Utc::now();
            let invalid = || ApiError::Unauthorized("Invalid or expired refresh token".to_owned());
            let user_id = RefreshTokenRepo::consume(conn, &digest(&payload.refresh_token), now)?
                .ok_or_else(invalid)?;
            let user = UserRepo::get_by_id(conn, user_id)?.ok_or_else(invalid)?;
            info!(user_id, "refresh token rotated");
            st.issue_tokens(conn, &user, now)
        })
        .await?;
    Ok(with_cookie(&state, jar, tokens))
}

async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> ApiResult<(CookieJar, Json<serde_json::Value>)> {
    let revoked = state
        .run(move |conn| Ok(RefreshTokenRepo::revoke(conn, &digest(&payload.refresh_token))?))
        .await?;
    if !revoked {
        return Err(ApiError::bad_request("Invalid refresh token"));
    }
    info!("refresh token revoked");
    Ok((jar.add(removal_cookie()), message("Successfully logged out")))
}

/// Expired `access_token` cookie, added on every logout.
fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((ACCESS_COOKIE, "")).path("/").http_only(true).build();
    cookie.make_removal();
    cookie
}

async fn me(user: CurrentUser) -> Json<User> {
    Json(user.0)
}

async fn request_reset(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ResetRequest>,
) -> ApiResult<Json<ResetIssued>> {
    let hours = state.settings.auth.reset_token_hours;
    let expose = state.settings.auth.expose_reset_token;
    let issued = state
        .run(move |conn| {
            let user = UserRepo::get_by_email(conn, payload.email.trim())?
                .ok_or_else(|| ApiError::not_found("Email not found"))?;
            let token = generate_token();
            let now = Utc::now();
            let expires_at = now + Duration::hours(hours);
            PasswordResetRepo::insert(conn, user.id, &digest(&token), expires_at, now)?;
            info!(user_id = user.id, "password reset requested");
            Ok(ResetIssued {
                message: "Password reset token generated",
                token: expose.then_some(token),
                expires_at,
            })
        })
        .await?;
    Ok(Json(issued))
}

async fn verify_reset(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ResetVerify>,
) -> ApiResult<Json<serde_json::Value>> {
    validation::password(&payload.new_password)?;
    state
        .run_tx(move |conn| {
            let now = Utc::now();
            let user_id = PasswordResetRepo::consume(conn, &digest(&payload.token), now)?
                .ok_or_else(|| ApiError::bad_request("Invalid or expired reset token"))?;
            let hash = hash_password(&payload.new_password)?;
            UserRepo::set_password(conn, user_id, &hash, now)?;
            let revoked = RefreshTokenRepo::revoke_all_for_user(conn, user_id)?;
            info!(user_id, revoked, "password reset completed");
            Ok(())
        })
        .await?;
    Ok(message("Password reset successful"))
}

async fn google(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(payload): ApiJson<GoogleLogin>,
) -> ApiResult<TokenResponse> {
    let profile = state
        .google()?
        .authenticate(&payload.code, payload.redirect_uri.as_deref())
        .await?;
    let st = state.clone();
    let tokens = state
        .run_tx(move |conn| {
            let now = Utc::now();
            let user = find_or_create_google_user(conn, &profile, now)?;
            UserRepo::touch_last_login(conn, user.id, now)?;
            st.issue_tokens(conn, &user, now)
        })
        .await?;
    Ok(with_cookie(&state, jar, tokens))
}

fn find_or_create_google_user(
    conn: &Connection,
    profile: &ipms_auth::GoogleUser,
    now: DateTime<Utc>,
) -> ApiResult<User> {
    let existing = match UserRepo::get_by_google_id(conn, &profile.id)? {
        Some(user) => Some(user),
        None => UserRepo::get_by_email(conn, &profile.email)?,
    };

    if let Some(mut user) = existing {
        let mut changed = false;
        if user.google_id.is_none() {
            user.google_id = Some(profile.id.clone());
            changed = true;
        }
        if user.full_name.is_none() && profile.name.is_some() {
            user.full_name.clone_from(&profile.name);
            changed = true;
        }
        if changed {
            user.updated_at = now;
            UserRepo::save(conn, &user)?;
        }
        return Ok(user);
    }

    let base = username_base(&profile.email);
    let mut username = base.clone();
    let mut suffix = 1;
    while UserRepo::username_exists(conn, &username)? {
        username = format!("{base}{suffix}");
        suffix += 1;
    }
    let user = UserRepo::create(
        conn,
        &NewUser {
            username: &username,
            email: &profile.email,
            full_name: profile.name.as_deref(),
            hashed_password: None,
            google_id: Some(&profile.id),
        },
        now,
    )?;
    info!(user_id = user.id, username = %user.username, "user created from google account");
    Ok(user)
}
