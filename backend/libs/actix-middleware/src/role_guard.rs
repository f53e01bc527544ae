//! Role-based access control
//!
//! Requires the identity attached by [`crate::JwtAuthMiddleware`] to hold one of a set
//! of roles. Must run after authentication; when no identity is attached the request is
//! refused with 403, never passed through.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use error_types::AuthError;
use futures::future::{ready, Ready};
use session_tokens::{Role, TokenPayload};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use crate::jwt_auth::AuthenticatedUser;

pub const ADMIN_ROLES: [Role; 2] = [Role::Admin, Role::SuperAdmin];

/// Membership check behind [`RoleGuard`]. `None` means no authentication ran.
pub fn require_roles(identity: Option<&TokenPayload>, allowed: &[Role]) -> Result<(), AuthError> {
    let forbidden = || AuthError::AuthorizationForbidden {
        required: allowed.iter().map(|role| role.as_str().to_string()).collect(),
    };

    match identity {
        Some(payload) if payload.has_any_role(allowed) => Ok(()),
        Some(payload) => {
            tracing::debug!(
                user_id = %payload.user_id(),
                role = %payload.role(),
                "Role check failed"
            );
            Err(forbidden())
        }
        None => {
            tracing::warn!("Role check ran without an authenticated identity");
            Err(forbidden())
        }
    }
}

#[derive(Clone)]
pub struct RoleGuard {
    allowed: Arc<[Role]>,
}

impl RoleGuard {
    pub fn any_of(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed: roles.into_iter().collect(),
        }
    }

    /// ADMIN or SUPER_ADMIN
    pub fn admin() -> Self {
        Self::any_of(ADMIN_ROLES)
    }

    pub fn allowed(&self) -> &[Role] {
        &self.allowed
    }
}

impl<S, B> Transform<S, ServiceRequest> for RoleGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RoleGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RoleGuardService {
            service: Rc::new(service),
            allowed: Arc::clone(&self.allowed),
        }))
    }
}

pub struct RoleGuardService<S> {
    service: Rc<S>,
    allowed: Arc<[Role]>,
}

impl<S, B> Service<ServiceRequest> for RoleGuardService<S>
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
        let allowed = Arc::clone(&self.allowed);

        Box::pin(async move {
            let decision = {
                let extensions = req.extensions();
                let identity = extensions.get::<AuthenticatedUser>().map(|user| &user.0);
                require_roles(identity, &allowed)
            };

            if let Err(e) = decision {
                return Ok(req.error_response(e).map_into_right_body());
            }

            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}
