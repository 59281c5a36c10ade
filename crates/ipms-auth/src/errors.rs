//! Auth error types.

/// Errors that can occur during authentication operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Username/password (or reset token) did not match.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Access token is malformed, forged, or expired.
    #[error("invalid token")]
    InvalidToken,

    /// A required provider is not configured.
    #[error("no auth configured for provider: {0}")]
    NotConfigured(String),

    /// OAuth token exchange or userinfo lookup failed.
    #[error("OAuth error ({status}): {message}")]
    OAuth {
        /// HTTP status code (0 if no response).
        status: u16,
        /// Error description.
        message: String,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Token signing failed.
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Password hashing failed.
    #[error("password hash error: {0}")]
    PasswordHash(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oauth_error_display() {
        let err = AuthError::OAuth {
            status: 400,
            message: "invalid_grant".to_string(),
        };
        assert_eq!(err.to_string(), "OAuth error (400): invalid_grant");
    }

    #[test]
    fn not_configured_display() {
        let err = AuthError::NotConfigured("google".to_string());
        assert_eq!(err.to_string(), "no auth configured for provider: google");
    }

    #[test]
    fn json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let auth_err = AuthError::from(json_err);
        assert!(auth_err.to_string().starts_with("JSON error"));
    }
}
