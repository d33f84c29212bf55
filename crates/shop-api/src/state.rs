//! # Application State
//!
//! Shared state for the Axum application.
//! Owns the token store and the components that read and write it.

use shop_core::{
    AccessGate, BoxedPaymentProvider, GrantIssuer, PaymentConfirmation, ShopError, TokenStore,
};
use shop_stripe::StripeProvider;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Directory of static frontend assets
    pub static_dir: PathBuf,
    /// Period of the expired-grant sweep; zero disables it
    pub sweep_interval: Duration,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Log output format
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: get("PORT").and_then(|p| p.parse().ok()).unwrap_or(4242),
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            sweep_interval: Duration::from_secs(
                get("GRANT_SWEEP_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3600),
            ),
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            log_format: match get("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port).parse().map_err(|e| {
            anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e)
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Shared application state
#[derive(Clone, Debug)]
pub struct AppState {
    /// Grant storage
    pub store: TokenStore,
    /// Mints tokens for demo purchases
    pub issuer: GrantIssuer,
    /// Download authorization
    pub gate: AccessGate,
    /// Checkout, verification and webhooks
    pub payments: PaymentConfirmation,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create state from a loaded config, with Stripe when configured.
    ///
    /// A missing `STRIPE_SECRET` is not fatal: the shop boots with payments
    /// disabled and only demo purchases work.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let provider = match StripeProvider::from_env() {
            Ok(stripe) => {
                info!(
                    "Stripe configured ({} mode)",
                    if stripe.config().is_test_mode() { "test" } else { "live" }
                );
                Some(Arc::new(stripe) as BoxedPaymentProvider)
            }
            Err(ShopError::NotConfigured(what)) => {
                warn!("{} not configured; running in demo-only mode", what);
                None
            }
            Err(e) => return Err(anyhow::anyhow!("Failed to initialize Stripe: {}", e)),
        };

        Ok(Self::with_provider(config, provider))
    }

    /// Create state around an explicit provider
    pub fn with_provider(config: AppConfig, provider: Option<BoxedPaymentProvider>) -> Self {
        let store = TokenStore::new();
        let issuer = GrantIssuer::new(store.clone());
        let gate = AccessGate::new(store.clone());
        let payments = PaymentConfirmation::new(provider, issuer.clone());

        Self {
            store,
            issuer,
            gate,
            payments,
            config,
        }
    }
}
