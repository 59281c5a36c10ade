//! Shared handler state.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use ipms_ai::{PlaceholderAssistant, SharedAssistant};
use ipms_auth::{GoogleClient, JwtKeys, TokenPair, digest, generate_token};
use ipms_core::models::User;
use ipms_settings::IpmsSettings;
use ipms_store::repositories::RefreshTokenRepo;
use ipms_store::{Connection, Database};

use crate::error::{ApiError, ApiResult};

/// State shared by every handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database pool.
    pub db: Database,
    /// Access token keys.
    pub jwt: Arc<JwtKeys>,
    /// Loaded settings.
    pub settings: Arc<IpmsSettings>,
    /// Google OAuth client, when configured.
    pub google: Option<GoogleClient>,
    /// Backend for `/api/ai`.
    pub assistant: SharedAssistant,
}

impl AppState {
    /// Build state from settings, with the placeholder assistant.
    pub fn new(settings: IpmsSettings, db: Database) -> Self {
        let jwt = JwtKeys::new(
            &settings.auth.secret_key,
            Duration::minutes(settings.auth.access_token_minutes),
        );
        Self {
            db,
            jwt: Arc::new(jwt),
            google: GoogleClient::from_settings(&settings.google),
            assistant: Arc::new(PlaceholderAssistant::new(&settings.ai)),
            settings: Arc::new(settings),
        }
    }

    /// Run `f` on a pooled connection off the async runtime.
    pub async fn run<F, T>(&self, f: F) -> ApiResult<T>
    where
        F: FnOnce(&Connection) -> ApiResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.db.call(move |conn| Ok(f(conn))).await?
    }

    /// Like [`run`](Self::run), inside a transaction that commits only when
    /// `f` returns `Ok`.
    pub async fn run_tx<F, T>(&self, f: F) -> ApiResult<T>
    where
        F: FnOnce(&Connection) -> ApiResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.db.transaction(f).await
    }

    /// Sign an access token and persist a fresh refresh token for `user`.
    pub fn issue_tokens(
        &self,
        conn: &Connection,
        user: &User,
        now: DateTime<Utc>,
    ) -> ApiResult<TokenPair> {
        let (access_token, expires_at) = self.jwt.issue(user.id, &user.username, now)?;
        let refresh_token = generate_token();
        let refresh_expires = now + Duration::days(self.settings.auth.refresh_token_days);
        RefreshTokenRepo::insert(conn, user.id, &digest(&refresh_token), refresh_expires, now)?;
        Ok(TokenPair::new(access_token, refresh_token, expires_at))
    }

    /// Where bug reports are appended.
    pub fn bug_reports_path(&self) -> PathBuf {
        PathBuf::from(&self.settings.server.bug_reports_path)
    }

    /// Google client or 503.
    pub fn google(&self) -> ApiResult<&GoogleClient> {
        self.google
            .as_ref()
            .ok_or_else(|| ApiError::Unavailable("Google OAuth is not configured".to_owned()))
    }
}
