//! HTTP surface of the proxy.
//!
//! - `tokens` - OAuth2 token routes (`/auth`, `/client-token`, `/user-token`, `/refresh-token`)
//! - `payments` - GraphQL forwarding routes (webhooks, payment requests, refunds)
//! - `health` - Health check endpoint (`/healthz`)
//! - `openapi` - OpenAPI/Utoipa configuration, served at `/api-docs`

pub mod health;
pub mod openapi;
pub mod payments;
pub mod tokens;

pub use health::MISC_TAG;

use crate::AppState;
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_redoc::{Redoc, Servable};

/// Message returned in every successful JSON body.
pub const SUCCESS: &str = "Success";

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(openapi::ApiDoc::openapi())
        .merge(tokens::router(state.clone()))
        .merge(payments::router(state))
        .routes(routes!(health::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .split_for_parts();

    router.merge(Redoc::with_url("/api-docs", api))
}

/// Bind to the configured address and serve until the process is stopped.
#[tracing::instrument(skip(state))]
pub async fn start_webserver(state: AppState) -> color_eyre::Result<()> {
    let addr = state.config.bind_address.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| color_eyre::Report::msg(format!("Failed to start server: {e}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
