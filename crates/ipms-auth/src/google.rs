//! Google OAuth authorization-code flow.
//!
//! The browser obtains a `code`; the server exchanges it at the token
//! endpoint and reads the account's identity from the userinfo endpoint.

use ipms_settings::GoogleSettings;
use serde::Deserialize;

use crate::errors::AuthError;

/// Identity returned by the userinfo endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct GoogleUser {
    /// Stable Google account id.
    pub id: String,
    /// Account email.
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Client for the Google token and userinfo endpoints.
#[derive(Clone, Debug)]
pub struct GoogleClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: Option<String>,
    token_url: String,
    userinfo_url: String,
}

impl GoogleClient {
    /// Build a client, or `None` when the client id or secret is missing.
    pub fn from_settings(settings: &GoogleSettings) -> Option<Self> {
        let client_id = settings.client_id.clone().filter(|s| !s.is_empty())?;
        let client_secret = settings.client_secret.clone().filter(|s| !s.is_empty())?;
        Some(Self {
            http: reqwest::Client::new(),
            client_id,
            client_secret,
            redirect_uri: settings.redirect_uri.clone(),
            token_url: settings.token_url.clone(),
            userinfo_url: settings.userinfo_url.clone(),
        })
    }

    /// Exchange `code` and fetch the account identity.
    ///
    /// `redirect_uri` overrides the configured one and must match what the
    /// browser used.
    #[tracing::instrument(skip_all, fields(provider = "google"))]
    pub async fn authenticate(
        &self,
        code: &str,
        redirect_uri: Option<&str>,
    ) -> Result<GoogleUser, AuthError> {
        let redirect_uri = redirect_uri
            .or(self.redirect_uri.as_deref())
            .ok_or_else(|| AuthError::NotConfigured("google redirect uri".to_string()))?;
        let access_token = self.exchange_code(code, redirect_uri).await?;
        let user = self.user_info(&access_token).await?;
        tracing::info!(google_id = %user.id, "google account verified");
        Ok(user)
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<String, AuthError> {
        let resp = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let text = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "google token exchange failed");
            return Err(AuthError::OAuth {
                status,
                message: text,
            });
        }

        let data: TokenResponse = resp.json().await?;
        Ok(data.access_token)
    }

    async fn user_info(&self, access_token: &str) -> Result<GoogleUser, AuthError> {
        let resp = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let text = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "google userinfo lookup failed");
            return Err(AuthError::OAuth {
                status,
                message: text,
            });
        }

        Ok(resp.json().await?)
    }
}

/// Username seed for a new account: the email's local part, reduced to
/// `[A-Za-z0-9_.-]` and padded to three characters.
pub fn username_base(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let mut base: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .take(40)
        .collect();
    while base.len() < 3 {
        base.push('_');
    }
    base
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
