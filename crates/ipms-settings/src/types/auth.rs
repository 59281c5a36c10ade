//! Token, cookie, and OAuth client settings.

use serde::{Deserialize, Serialize};

/// Placeholder signing key. The server warns at startup while it is in use.
pub const DEFAULT_SECRET_KEY: &str = "change-me-in-production";

/// Google's OAuth 2.0 token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Google's userinfo endpoint.
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Access/refresh token and password reset settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthSettings {
    /// HS256 signing key for access tokens.
    pub secret_key: String,
    /// Access token lifetime.
    pub access_token_minutes: i64,
    /// Refresh token lifetime.
    pub refresh_token_days: i64,
    /// Password reset token lifetime.
    pub reset_token_hours: i64,
    /// Return the reset token in the API response instead of only logging
    /// that one was issued. Intended for deployments without mail delivery.
    pub expose_reset_token: bool,
    /// Set the `Secure` attribute on the `access_token` cookie.
    pub cookie_secure: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            access_token_minutes: 30,
            refresh_token_days: 30,
            reset_token_hours: 24,
            expose_reset_token: true,
            cookie_secure: true,
        }
    }
}

impl AuthSettings {
    /// Whether the compiled placeholder key is still in use.
    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

/// Google OAuth client settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoogleSettings {
    /// OAuth client id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// OAuth client secret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Redirect URI registered with Google.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    /// Token endpoint.
    pub token_url: String,
    /// Userinfo endpoint.
    pub userinfo_url: String,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }
}

impl GoogleSettings {
    /// Client id and secret are both set.
    pub fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}
