//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and `#[serde(default)]`
//! so a settings file may contain any subset of fields.

mod ai;
mod auth;
mod server;

pub use ai::*;
pub use auth::*;
pub use server::*;

use serde::{Deserialize, Serialize};

/// Root settings type.
///
/// ```json
/// {
///   "server": { "port": 9000 },
///   "auth": { "secretKey": "..." }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IpmsSettings {
    /// HTTP listener and CORS.
    pub server: ServerSettings,
    /// `SQLite` database.
    pub database: DatabaseSettings,
    /// Tokens and cookies.
    pub auth: AuthSettings,
    /// Google OAuth client.
    pub google: GoogleSettings,
    /// AI assistant facade.
    pub ai: AiSettings,
    /// Log output.
    pub logging: LoggingSettings,
}
