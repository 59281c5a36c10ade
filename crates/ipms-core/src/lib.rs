//! # ipms-core
//!
//! Shared domain types for the IPMS backend.
//!
//! - [`enums`]: status, priority, role, and sort enums stored as text columns
//! - [`models`]: row types plus their create/update/filter payloads
//! - [`validation`]: field checks shared by the HTTP and store layers
//! - [`patch`]: serde helper for distinguishing absent from `null` in partial updates
//! - [`logging`]: `tracing` subscriber setup

#![deny(unsafe_code)]

pub mod enums;
pub mod logging;
pub mod models;
pub mod patch;
pub mod validation;

pub use enums::*;
pub use validation::{ValidationError, ValidationResult};
