use actix_middleware::{AuthenticatedUser, MaybeUser};
use actix_web::{web, HttpResponse};
use error_types::AuthError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use session_tokens::{TokenPair, TokenPayload, TokenService};

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<TokenPayload>,
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Exchange a refresh token for a new pair. Signing runs on the blocking pool.
pub async fn refresh(
    tokens: web::Data<TokenService>,
    body: web::Json<RefreshRequest>,
) -> Result<web::Json<TokenPair>, AuthError> {
    let refresh_token = body.into_inner().refresh_token;

    let pair = web::block(move || tokens.refresh_token_pair(&refresh_token))
        .await
        .map_err(|e| AuthError::TokenIssuanceFailed(e.to_string()))??;

    Ok(web::Json(pair))
}

pub async fn me(user: AuthenticatedUser) -> web::Json<TokenPayload> {
    web::Json(user.0)
}

pub async fn session(user: MaybeUser) -> web::Json<SessionView> {
    web::Json(SessionView {
        authenticated: user.0.is_some(),
        user: user.0,
    })
}

pub async fn admin_health(user: AuthenticatedUser) -> HttpResponse {
    tracing::info!(user_id = %user.user_id(), role = %user.role(), "Admin health probe");
    HttpResponse::Ok().json(json!({ "status": "ok", "role": user.role() }))
}
