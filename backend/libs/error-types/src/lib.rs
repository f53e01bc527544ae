//! Error boundary for the session token subsystem
//!
//! Every failure produced by key loading, token issuance, token verification and the
//! request hooks is one of the [`AuthError`] kinds. Low-level crypto and parsing errors
//! never cross this boundary; they are logged where they happen and converted here.
//!
//! `AuthError` implements actix-web's `ResponseError`, so handlers and middleware can
//! return it directly and get a uniform JSON body.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthError>;

/// Stable, externally visible error codes
pub mod error_codes {
    /// Missing, malformed or invalid access credential
    pub const AUTH_TOKEN_INVALID: &str = "AUTH_TOKEN_INVALID";
    pub const AUTH_REFRESH_TOKEN_INVALID: &str = "AUTH_REFRESH_TOKEN_INVALID";
    pub const AUTHZ_FORBIDDEN: &str = "AUTHZ_FORBIDDEN";
    pub const AUTH_KEY_MATERIAL_INVALID: &str = "AUTH_KEY_MATERIAL_INVALID";
    pub const AUTH_TOKEN_ISSUANCE_FAILED: &str = "AUTH_TOKEN_ISSUANCE_FAILED";
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Configured key text could not be parsed as an RSA key
    #[error("Invalid key material: {0}")]
    KeyMaterialInvalid(String),

    #[error("Token issuance failed: {0}")]
    TokenIssuanceFailed(String),

    #[error("Invalid access token")]
    AccessTokenInvalid,

    #[error("Invalid refresh token")]
    RefreshTokenInvalid,

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Forbidden: requires one of [{}]", required.join(", "))]
    AuthorizationForbidden { required: Vec<String> },
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::KeyMaterialInvalid(_) => error_codes::AUTH_KEY_MATERIAL_INVALID,
            AuthError::TokenIssuanceFailed(_) => error_codes::AUTH_TOKEN_ISSUANCE_FAILED,
            AuthError::AccessTokenInvalid | AuthError::AuthenticationRequired => {
                error_codes::AUTH_TOKEN_INVALID
            }
            AuthError::RefreshTokenInvalid => error_codes::AUTH_REFRESH_TOKEN_INVALID,
            AuthError::AuthorizationForbidden { .. } => error_codes::AUTHZ_FORBIDDEN,
        }
    }

    /// True for failures the caller can fix by presenting different credentials
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            AuthError::AccessTokenInvalid
                | AuthError::RefreshTokenInvalid
                | AuthError::AuthenticationRequired
        )
    }

    /// Message safe to show to clients.
    ///
    /// Authentication failures never say which check failed; internal failures never
    /// carry their detail.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::AccessTokenInvalid | AuthError::AuthenticationRequired => {
                "Unauthorized".to_string()
            }
            AuthError::RefreshTokenInvalid => "Unauthorized: refresh token rejected".to_string(),
            AuthError::AuthorizationForbidden { .. } => self.to_string(),
            AuthError::KeyMaterialInvalid(_) | AuthError::TokenIssuanceFailed(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl From<&AuthError> for ErrorResponse {
    fn from(err: &AuthError) -> Self {
        ErrorResponse {
            error: err.code().to_string(),
            message: err.public_message(),
        }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        if self.is_authentication_failure() {
            return StatusCode::UNAUTHORIZED;
        }

        match self {
            AuthError::AuthorizationForbidden { .. } => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            tracing::error!(error = %self, "auth subsystem failure");
        }

        let mut builder = HttpResponse::build(self.status_code());
        if self.status_code() == StatusCode::UNAUTHORIZED {
            builder.insert_header(("WWW-Authenticate", "Bearer"));
        }
        builder.json(ErrorResponse::from(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(err: &AuthError) -> ErrorResponse {
        let bytes = to_bytes(err.error_response().into_body())
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[test]
    fn test_authentication_failures_share_code() {
        assert_eq!(AuthError::AccessTokenInvalid.code(), "AUTH_TOKEN_INVALID");
        assert_eq!(AuthError::AuthenticationRequired.code(), "AUTH_TOKEN_INVALID");
        assert_eq!(
            AuthError::RefreshTokenInvalid.code(),
            "AUTH_REFRESH_TOKEN_INVALID"
        );
    }

    #[test]
    fn test_authentication_failures_are_retryable_with_new_credentials() {
        assert!(AuthError::AccessTokenInvalid.is_authentication_failure());
        assert!(AuthError::RefreshTokenInvalid.is_authentication_failure());
        assert!(AuthError::AuthenticationRequired.is_authentication_failure());
        assert!(!AuthError::AuthorizationForbidden { required: vec![] }.is_authentication_failure());
        assert!(!AuthError::TokenIssuanceFailed("overflow".into()).is_authentication_failure());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::AuthenticationRequired.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::AuthorizationForbidden { required: vec![] }.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::KeyMaterialInvalid("bad pem".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AuthError::RefreshTokenInvalid.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::TokenIssuanceFailed("overflow".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_rt::test]
    async fn test_unauthorized_body_is_generic() {
        let body = body_of(&AuthError::AccessTokenInvalid).await;
        assert_eq!(body.error, "AUTH_TOKEN_INVALID");
        assert_eq!(body.message, "Unauthorized");

        let resp = AuthError::AuthenticationRequired.error_response();
        assert_eq!(
            resp.headers().get("WWW-Authenticate").unwrap(),
            "Bearer"
        );
    }

    #[actix_rt::test]
    async fn test_forbidden_names_required_roles() {
        let err = AuthError::AuthorizationForbidden {
            required: vec!["ADMIN".into(), "SUPER_ADMIN".into()],
        };
        let body = body_of(&err).await;
        assert_eq!(body.error, "AUTHZ_FORBIDDEN");
        assert!(body.message.contains("ADMIN, SUPER_ADMIN"));
    }

    #[actix_rt::test]
    async fn test_internal_detail_is_not_exposed() {
        let err = AuthError::KeyMaterialInvalid("unexpected PEM tag".into());
        let body = body_of(&err).await;
        assert_eq!(body.error, "AUTH_KEY_MATERIAL_INVALID");
        assert!(!body.message.contains("PEM"));
    }
}
