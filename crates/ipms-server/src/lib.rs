//! # ipms-server
//!
//! The IPMS REST API on axum.
//!
//! - [`server`]: router assembly, CORS/trace layers, `serve`
//! - [`routes`]: one module per resource under `/api`
//! - [`extract`]: JSON/query/path extractors with `{"detail"}` rejections,
//!   and the [`CurrentUser`](extract::CurrentUser) bearer/cookie guard
//! - [`error`]: [`ApiError`](error::ApiError) and its status mapping
//! - [`state`]: shared [`AppState`](state::AppState)
//! - [`shutdown`]: graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod error;
pub mod extract;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod state;

pub use error::ApiError;
pub use server::{build_router, serve};
pub use shutdown::ShutdownCoordinator;
pub use state::AppState;
