//! # Shop Error Types
//!
//! Typed error handling for the storefront gate.
//! All fallible operations return `Result<T, ShopError>`.

use thiserror::Error;

/// Core error type for grant, gate and payment operations
#[derive(Debug, Error)]
pub enum ShopError {
    /// A required credential (secret key, webhook secret) is missing
    #[error("{0} not configured")]
    NotConfigured(String),

    /// Token missing from the store or past its expiry
    #[error("Unauthorized or token expired")]
    Unauthorized,

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    Provider { provider: String, message: String },

    /// Network/HTTP error communicating with provider
    #[error("Network error: {0}")]
    Network(String),

    /// Webhook signature verification failed
    #[error("Webhook verification failed: {0}")]
    WebhookVerificationFailed(String),

    /// Verified webhook body is not a well-formed event
    #[error("Webhook parse error: {0}")]
    WebhookParse(String),

    /// Provider response could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The OS random source failed; no token can be minted
    #[error("Randomness source failure: {0}")]
    Randomness(String),
}

impl ShopError {
    /// Returns true if this error comes from the webhook security boundary
    pub fn is_webhook_rejection(&self) -> bool {
        matches!(
            self,
            ShopError::WebhookVerificationFailed(_) | ShopError::WebhookParse(_)
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ShopError::NotConfigured(_) => 503,
            ShopError::Unauthorized => 401,
            ShopError::InvalidRequest(_) => 400,
            ShopError::Provider { .. } => 502,
            ShopError::Network(_) => 503,
            ShopError::WebhookVerificationFailed(_) => 400,
            ShopError::WebhookParse(_) => 400,
            ShopError::Serialization(_) => 502,
            ShopError::Randomness(_) => 500,
        }
    }
}

/// Result type alias for shop operations
pub type ShopResult<T> = Result<T, ShopError>;
