//! # ipms-store
//!
//! `SQLite` persistence for IPMS.
//!
//! - [`connection`]: `r2d2` pool with WAL and foreign keys enabled
//! - [`migrations`]: embedded, versioned schema migrations
//! - [`repositories`]: stateless per-table repositories taking `&Connection`
//! - [`Database`]: the pool plus an async bridge onto the blocking pool

#![deny(unsafe_code)]

pub mod connection;
pub mod database;
pub mod errors;
pub mod migrations;
pub mod repositories;
pub mod row_helpers;

pub use connection::{ConnectionConfig, ConnectionPool};
pub use database::Database;
pub use errors::{Result, StoreError};
pub use rusqlite::Connection;
