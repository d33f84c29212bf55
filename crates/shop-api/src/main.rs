//! # Storefront Gate
//!
//! Sell one file: Stripe checkout in, time-limited download tokens out.
//!
//! ## Usage
//!
//! ```bash
//! # Optional: without these the shop runs in demo-only mode
//! export STRIPE_SECRET=sk_test_...
//! export STRIPE_PRICE_ID=price_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...
//!
//! # Run the server
//! storefront
//! ```

use shop_api::{
    routes,
    state::{AppConfig, AppState, LogFormat},
    sweeper,
};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config first: it loads .env, which may set RUST_LOG and LOG_FORMAT
    let config = AppConfig::from_env();
    init_logging(config.log_format);

    // Initialize application state
    let state = AppState::from_config(config)?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!(
        "Payment provider: {}",
        state.payments.provider_name().unwrap_or("none (demo only)")
    );
    info!("Static files: {}", state.config.static_dir.display());

    sweeper::spawn_expiry_sweeper(state.store.clone(), state.config.sweep_interval);

    // Create router
    let app = routes::create_router(state);

    info!("Storefront starting on http://{}", addr);

    if !is_prod {
        info!("Demo:     POST http://{}/demo-purchase", addr);
        info!("Checkout: POST http://{}/create-checkout-session", addr);
        info!("Webhook:  POST http://{}/webhook", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Storefront stopped");
    Ok(())
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
