//! JWT authentication middleware
//!
//! Extracts the bearer credential from the `Authorization` header, verifies it as an
//! access token and attaches the resulting identity to the request. Handlers read it back
//! through the [`AuthenticatedUser`] / [`MaybeUser`] extractors.
//!
//! Two modes:
//! - `required`: missing, malformed or invalid credential rejects the request with 401
//! - `optional`: the request continues without an identity, no error
//!
//! ## Example
//! ```rust,no_run
//! use actix_middleware::{JwtAuthMiddleware, RoleGuard};
//! use actix_web::{web, App};
//! # fn app(tokens: std::sync::Arc<session_tokens::TokenService>) {
//! let app = App::new().service(
//!     web::scope("/admin")
//!         // registered last, runs first
//!         .wrap(RoleGuard::admin())
//!         .wrap(JwtAuthMiddleware::required(tokens)),
//! );
//! # }
//! ```

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use error_types::AuthError;
use futures::future::{ready, Ready};
use session_tokens::{TokenPayload, TokenService};
use std::future::Future;
use std::ops::Deref;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

const BEARER_PREFIX: &str = "Bearer ";

/// Verified identity attached to the request by [`JwtAuthMiddleware`]
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub TokenPayload);

impl Deref for AuthenticatedUser {
    type Target = TokenPayload;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Identity if one was attached, for endpoints with anonymous behavior
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<TokenPayload>);

/// Token from an `Authorization: Bearer <token>` header value.
///
/// Absent header, other schemes and empty tokens all count as "no credential".
pub fn bearer_token(authorization: Option<&str>) -> Option<&str> {
    authorization?
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Mandatory authentication: a valid access token or an error.
pub fn authenticate(
    tokens: &TokenService,
    authorization: Option<&str>,
) -> Result<TokenPayload, AuthError> {
    let token = bearer_token(authorization).ok_or(AuthError::AuthenticationRequired)?;
    tokens.verify_access_token(token)
}

/// Optional authentication: any failure leaves the request anonymous.
pub fn authenticate_optional(
    tokens: &TokenService,
    authorization: Option<&str>,
) -> Option<TokenPayload> {
    let token = bearer_token(authorization)?;
    match tokens.verify_access_token(token) {
        Ok(payload) => Some(payload),
        Err(e) => {
            tracing::debug!(error = %e, "Optional authentication failed, continuing anonymously");
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Required,
    Optional,
}

/// JWT Authentication Middleware
#[derive(Clone)]
pub struct JwtAuthMiddleware {
    tokens: Arc<TokenService>,
    mode: AuthMode,
}

impl JwtAuthMiddleware {
    pub fn required(tokens: Arc<TokenService>) -> Self {
        Self {
            tokens,
            mode: AuthMode::Required,
        }
    }

    pub fn optional(tokens: Arc<TokenService>) -> Self {
        Self {
            tokens,
            mode: AuthMode::Optional,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = JwtAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            tokens: Arc::clone(&self.tokens),
            mode: self.mode,
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    tokens: Arc<TokenService>,
    mode: AuthMode,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let tokens = Arc::clone(&self.tokens);
        let mode = self.mode;

        Box::pin(async move {
            let authorization = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok());

            let identity = match mode {
                AuthMode::Required => match authenticate(&tokens, authorization) {
                    Ok(payload) => Some(payload),
                    Err(e) => {
                        tracing::warn!(
                            path = %req.path(),
                            error = %e,
                            "Rejected unauthenticated request"
                        );
                        return Ok(req.error_response(e).map_into_right_body());
                    }
                },
                AuthMode::Optional => authenticate_optional(&tokens, authorization),
            };

            if let Some(payload) = identity {
                req.extensions_mut().insert(AuthenticatedUser(payload));
            }

            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(AuthError::AuthenticationRequired.into())),
        }
    }
}

impl FromRequest for MaybeUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = req
            .extensions()
            .get::<AuthenticatedUser>()
            .map(|user| user.0.clone());
        ready(Ok(MaybeUser(user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use session_tokens::testing::{sample_identity, test_service};
    use session_tokens::Role;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(Some("Bearer   abc ")), Some("abc"));
        assert_eq!(bearer_token(None), None);
        assert_eq!(bearer_token(Some("")), None);
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(Some("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(Some("abc.def.ghi")), None);
    }

    #[test]
    fn test_authenticate_missing_header() {
        let tokens = test_service();
        assert_eq!(
            authenticate(&tokens, None),
            Err(AuthError::AuthenticationRequired)
        );
        assert_eq!(
            authenticate(&tokens, Some("Token abc")),
            Err(AuthError::AuthenticationRequired)
        );
    }

    #[test]
    fn test_authenticate_invalid_token() {
        let tokens = test_service();
        let err = authenticate(&tokens, Some("Bearer invalid.token.here")).unwrap_err();
        assert_eq!(err, AuthError::AccessTokenInvalid);
        // same externally visible class as a missing header
        assert_eq!(err.code(), AuthError::AuthenticationRequired.code());
    }

    #[test]
    fn test_authenticate_valid_access_token() {
        let tokens = test_service();
        let identity = sample_identity(Role::Tenant);
        let pair = tokens.issue_token_pair(&identity).unwrap();

        let header = format!("Bearer {}", pair.access_token);
        let payload = authenticate(&tokens, Some(&header)).unwrap();
        assert_eq!(payload.identity(), &identity);
    }

    #[test]
    fn test_authenticate_rejects_refresh_token() {
        let tokens = test_service();
        let pair = tokens
            .issue_token_pair(&sample_identity(Role::Tenant))
            .unwrap();

        let header = format!("Bearer {}", pair.refresh_token);
        assert_eq!(
            authenticate(&tokens, Some(&header)),
            Err(AuthError::AccessTokenInvalid)
        );
    }

    #[test]
    fn test_optional_authentication_never_fails() {
        let tokens = test_service();
        assert!(authenticate_optional(&tokens, None).is_none());
        assert!(authenticate_optional(&tokens, Some("Bearer nope")).is_none());

        let pair = tokens
            .issue_token_pair(&sample_identity(Role::Agent))
            .unwrap();
        let header = format!("Bearer {}", pair.access_token);
        assert_eq!(
            authenticate_optional(&tokens, Some(&header)).map(|p| p.role()),
            Some(Role::Agent)
        );
    }
}
