//! Auth gateway: hosts the session token hooks over HTTP.
//!
//! Owns configuration loading and logging setup; token logic lives in `session-tokens`
//! and the request hooks in `actix-middleware`.

pub mod config;
pub mod handlers;
pub mod routes;
