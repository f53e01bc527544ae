//! Auth Gateway - Main entry point

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth_gateway::{config::Settings, routes};
use session_tokens::{KeyMaterialProvider, TokenService};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json().with_target(false))
        .init();

    let settings = Settings::load().context("Failed to load configuration")?;
    tracing::info!(auth = ?settings.auth, "Starting auth-gateway v{}", env!("CARGO_PKG_VERSION"));

    // Malformed key material is fatal here rather than on the first request
    let keys = Arc::new(KeyMaterialProvider::from_config(&settings.auth));
    keys.preload().context("Failed to load JWT key material")?;
    let tokens = Arc::new(TokenService::new(&settings.auth, keys));

    let bind_addr = (settings.server.host.clone(), settings.server.port);
    tracing::info!(host = %bind_addr.0, port = bind_addr.1, "HTTP server listening");

    let mut server = HttpServer::new(move || {
        let tokens = Arc::clone(&tokens);
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::JsonConfig::default().limit(16 * 1024))
            .configure(|cfg| routes::configure(cfg, tokens))
    });
    if let Some(workers) = settings.server.workers {
        server = server.workers(workers);
    }

    server
        .bind(bind_addr)
        .context("Failed to bind HTTP listener")?
        .run()
        .await
        .context("HTTP server error")?;

    Ok(())
}
