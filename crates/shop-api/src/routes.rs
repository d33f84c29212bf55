//! # Routes
//!
//! Axum router configuration for the storefront API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - POST /demo-purchase - Issue a demo token
/// - POST /create-checkout-session - Start a Stripe checkout
/// - POST /verify-session - Exchange a paid session for a token
/// - POST /webhook - Stripe webhook handler (raw body)
/// - GET  /protected-file - Token-gated download
/// - GET  /health - Health check
///
/// Anything else is served from the static directory.
pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    api_routes()
        .fallback_service(static_files)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors()),
        )
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/demo-purchase", post(handlers::demo_purchase))
        .route("/create-checkout-session", post(handlers::create_checkout_session))
        .route("/verify-session", post(handlers::verify_session))
        .route("/webhook", post(handlers::stripe_webhook))
        .route("/protected-file", get(handlers::protected_file))
}

fn cors() -> CorsLayer {
    // The storefront page may be hosted anywhere.
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Create a router without static files or middleware, for testing
#[cfg(test)]
pub fn create_test_router(state: AppState) -> Router {
    api_routes().with_state(state)
}
