//! # Stripe Configuration
//!
//! Configuration management for the Stripe integration.
//! All secrets are loaded from environment variables; only `STRIPE_SECRET`
//! is required; without it the shop runs with payments disabled.

use shop_core::ShopError;
use std::env;
use tracing::warn;

/// Default redirect after payment. Stripe substitutes the session ID.
pub const DEFAULT_SUCCESS_URL: &str = "http://localhost:4242?session_id={CHECKOUT_SESSION_ID}";

/// Default redirect when the buyer abandons checkout
pub const DEFAULT_CANCEL_URL: &str = "http://localhost:4242?canceled=true";

const API_BASE_URL: &str = "https://api.stripe.com";
const API_VERSION: &str = "2024-12-18.acacia";

/// Stripe API configuration
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_test_... or sk_live_...)
    pub secret_key: String,

    /// Price ID of the single product sold (price_...)
    pub price_id: String,

    /// Webhook signing secret (whsec_...); webhooks are refused without it
    pub webhook_secret: Option<String>,

    /// Redirect after successful payment
    pub success_url: String,

    /// Redirect after cancelled payment
    pub cancel_url: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// API version
    pub api_version: String,
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// - `STRIPE_SECRET` (required)
    /// - `STRIPE_PRICE_ID`
    /// - `STRIPE_WEBHOOK_SECRET`
    /// - `SUCCESS_URL`, `CANCEL_URL`
    pub fn from_env() -> Result<Self, ShopError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ShopError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let secret_key = get("STRIPE_SECRET")
            .ok_or_else(|| ShopError::NotConfigured("Stripe".to_string()))?;

        if !secret_key.starts_with("sk_test_") && !secret_key.starts_with("sk_live_") {
            warn!("STRIPE_SECRET does not look like a Stripe secret key");
        }

        let price_id = get("STRIPE_PRICE_ID").unwrap_or_default();
        if price_id.is_empty() {
            warn!("STRIPE_PRICE_ID not set; checkout creation will be rejected by Stripe");
        }

        let webhook_secret = get("STRIPE_WEBHOOK_SECRET");
        match &webhook_secret {
            None => warn!("STRIPE_WEBHOOK_SECRET not set; webhooks will be refused"),
            Some(secret) if !secret.starts_with("whsec_") => {
                warn!("STRIPE_WEBHOOK_SECRET does not start with whsec_")
            }
            Some(_) => {}
        }

        Ok(Self {
            secret_key,
            price_id,
            webhook_secret,
            success_url: get("SUCCESS_URL").unwrap_or_else(|| DEFAULT_SUCCESS_URL.to_string()),
            cancel_url: get("CANCEL_URL").unwrap_or_else(|| DEFAULT_CANCEL_URL.to_string()),
            api_base_url: API_BASE_URL.to_string(),
            api_version: API_VERSION.to_string(),
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(
        secret_key: impl Into<String>,
        price_id: impl Into<String>,
        webhook_secret: Option<String>,
    ) -> Self {
        Self {
            secret_key: secret_key.into(),
            price_id: price_id.into(),
            webhook_secret,
            success_url: DEFAULT_SUCCESS_URL.to_string(),
            cancel_url: DEFAULT_CANCEL_URL.to_string(),
            api_base_url: API_BASE_URL.to_string(),
            api_version: API_VERSION.to_string(),
        }
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.secret_key.starts_with("sk_test_")
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.secret_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Builder: set redirect URLs
    pub fn with_redirects(
        mut self,
        success_url: impl Into<String>,
        cancel_url: impl Into<String>,
    ) -> Self {
        self.success_url = success_url.into();
        self.cancel_url = cancel_url.into();
        self
    }
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("test_mode", &self.is_test_mode())
            .field("price_id", &self.price_id)
            .field("webhook_secret", &self.webhook_secret.is_some())
            .field("success_url", &self.success_url)
            .field("cancel_url", &self.cancel_url)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_missing_secret_is_not_configured() {
        let result = StripeConfig::from_lookup(lookup(&[("STRIPE_PRICE_ID", "price_1")]));
        assert!(matches!(result, Err(ShopError::NotConfigured(_))));

        let result = StripeConfig::from_lookup(lookup(&[("STRIPE_SECRET", "")]));
        assert!(matches!(result, Err(ShopError::NotConfigured(_))));
    }

    #[test]
    fn test_defaults() {
        let config =
            StripeConfig::from_lookup(lookup(&[("STRIPE_SECRET", "sk_test_abc")])).unwrap();

        assert!(config.is_test_mode());
        assert_eq!(config.price_id, "");
        assert!(config.webhook_secret.is_none());
        assert_eq!(config.success_url, DEFAULT_SUCCESS_URL);
        assert_eq!(config.cancel_url, DEFAULT_CANCEL_URL);
        assert_eq!(config.api_base_url, "https://api.stripe.com");
    }

    #[test]
    fn test_full_config() {
        let config = StripeConfig::from_lookup(lookup(&[
            ("STRIPE_SECRET", "sk_live_abc"),
            ("STRIPE_PRICE_ID", "price_123"),
            ("STRIPE_WEBHOOK_SECRET", "whsec_xyz"),
            ("SUCCESS_URL", "https://shop.test/ok?session_id={CHECKOUT_SESSION_ID}"),
            ("CANCEL_URL", "https://shop.test/cancel"),
        ]))
        .unwrap();

        assert!(!config.is_test_mode());
        assert_eq!(config.price_id, "price_123");
        assert_eq!(config.webhook_secret.as_deref(), Some("whsec_xyz"));
        assert_eq!(config.cancel_url, "https://shop.test/cancel");
    }

    #[test]
    fn test_auth_header() {
        let config = StripeConfig::new("sk_test_abc123", "price_1", None);
        assert_eq!(config.auth_header(), "Bearer sk_test_abc123");
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = StripeConfig::new("sk_test_abc123", "price_1", Some("whsec_s3cret".into()));
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk_test_abc123"));
        assert!(!printed.contains("whsec_s3cret"));
    }
}
