//! # Actix Middleware Library
//!
//! Request-time authentication and authorization for actix-web services
//!
//! ## Modules
//! - `jwt_auth`: bearer token authentication (required or optional) and identity extractors
//! - `role_guard`: role-set enforcement on top of an authenticated identity
//!
//! Authentication must wrap outside any role guard so it runs first:
//! `.wrap(RoleGuard::admin()).wrap(JwtAuthMiddleware::required(tokens))`.

pub mod jwt_auth;
pub mod role_guard;

pub use jwt_auth::{
    authenticate, authenticate_optional, bearer_token, AuthMode, AuthenticatedUser,
    JwtAuthMiddleware, MaybeUser,
};
pub use role_guard::{require_roles, RoleGuard, ADMIN_ROLES};
