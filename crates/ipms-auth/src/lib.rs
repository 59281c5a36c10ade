//! # ipms-auth
//!
//! Credentials and tokens for the IPMS API.
//!
//! - [`password`]: argon2 hashing and verification
//! - [`jwt`]: HS256 access tokens carrying the username and user id
//! - [`tokens`]: opaque refresh/reset tokens and their stored digests
//! - [`google`]: OAuth authorization-code exchange and userinfo lookup
//!
//! Nothing here touches the database. The server pairs these primitives with
//! the token repositories in `ipms-store`.

#![deny(unsafe_code)]

pub mod errors;
pub mod google;
pub mod jwt;
pub mod password;
pub mod tokens;

pub use errors::AuthError;
pub use google::{GoogleClient, GoogleUser};
pub use jwt::{Claims, JwtKeys};
pub use password::{hash_password, verify_password};
pub use tokens::{TokenPair, digest, generate_token};
