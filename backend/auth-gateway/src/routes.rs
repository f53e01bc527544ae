use actix_middleware::{JwtAuthMiddleware, RoleGuard};
use actix_web::web;
use session_tokens::TokenService;
use std::sync::Arc;

use crate::handlers;

/// Mount every route. Authentication is wrapped outside role guards so it runs first.
pub fn configure(cfg: &mut web::ServiceConfig, tokens: Arc<TokenService>) {
    cfg.app_data(web::Data::from(Arc::clone(&tokens)))
        .route("/health", web::get().to(handlers::health))
        .service(
            web::scope("/v1")
                .route("/auth/refresh", web::post().to(handlers::refresh))
                .service(
                    web::resource("/me")
                        .wrap(JwtAuthMiddleware::required(Arc::clone(&tokens)))
                        .route(web::get().to(handlers::me)),
                )
                .service(
                    web::resource("/session")
                        .wrap(JwtAuthMiddleware::optional(Arc::clone(&tokens)))
                        .route(web::get().to(handlers::session)),
                )
                .service(
                    web::scope("/admin")
                        .wrap(RoleGuard::admin())
                        .wrap(JwtAuthMiddleware::required(Arc::clone(&tokens)))
                        .route("/health", web::get().to(handlers::admin_health)),
                ),
        );
}
