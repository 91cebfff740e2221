//! Axum HTTP server: router, listener, graceful shutdown.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::audit::AuditProxy;
use crate::config::ProxyConfig;
use crate::request_id;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ProxyConfig,
    pub audit: AuditProxy,
}

/// Build the router.
///
/// Audit routes always sit behind the shared secret, `/health` only when
/// `auth.protect_health` is set. Anything unmatched is served from the static
/// directory without a secret.
pub fn router(state: AppState) -> Router {
    let protect_health = state.config.auth.protect_health;
    let allow_cors = state.config.server.allow_cors;
    let static_dir = ServeDir::new(&state.config.server.static_dir);
    let state = Arc::new(state);

    let audits = Router::new()
        .route("/pagespeed-audit", get(handlers::handle_audit))
        .route("/audit", get(handlers::handle_audit))
        .route("/pagespeed-core-web-vitals", get(handlers::handle_core_web_vitals))
        .route("/pagespeed-seo", get(handlers::handle_seo))
        .route("/pagespeed-screenshot", get(handlers::handle_screenshot));
    let health = Router::new().route("/health", get(handlers::handle_health));

    let (protected, public) = if protect_health {
        (audits.merge(health), Router::new())
    } else {
        (audits, health)
    };

    let protected = protected.route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_secret,
    ));

    let app = protected
        .merge(public)
        .fallback_service(static_dir)
        .layer(middleware::from_fn(request_id::assign))
        .layer(TraceLayer::new_for_http());

    let app = if allow_cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    };

    app.with_state(state)
}

/// Build and run the HTTP server.
pub async fn run(state: AppState) -> anyhow::Result<()> {
    let listen_addr = state.config.server.listen_address.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(address = %listen_addr, "TechAudit backend listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("TechAudit backend shut down gracefully");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) for graceful shutdown.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install CTRL+C signal handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
