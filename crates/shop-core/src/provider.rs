//! # Payment Provider Trait
//!
//! The seam between grant bookkeeping and the hosted-checkout provider.
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │         PaymentProvider (trait)            │
//! │  ├── create_checkout()                     │
//! │  ├── retrieve_session()                    │
//! │  ├── verify_webhook()                      │
//! │  ├── webhook_configured()                  │
//! │  └── provider_name()                       │
//! └────────────────────────────────────────────┘
//!                     ▲
//!             ┌───────┴────────┐
//!             │ StripeProvider │
//!             └────────────────┘
//! ```

use crate::error::ShopResult;
use crate::session::{CheckoutSession, SessionDetails, WebhookEvent};
use async_trait::async_trait;
use std::sync::Arc;

/// Hosted checkout provider.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a checkout session for the shop's single product.
    async fn create_checkout(&self) -> ShopResult<CheckoutSession>;

    /// Fetch a checkout session's payment state.
    async fn retrieve_session(&self, session_id: &str) -> ShopResult<SessionDetails>;

    /// Verify a webhook signature and parse the event.
    ///
    /// Must fail with `NotConfigured` when no webhook secret is held.
    async fn verify_webhook(&self, payload: &[u8], signature: &str) -> ShopResult<WebhookEvent>;

    /// Whether webhook deliveries can be verified.
    fn webhook_configured(&self) -> bool {
        true
    }

    /// Provider name for logging.
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared provider (dynamic dispatch)
pub type BoxedPaymentProvider = Arc<dyn PaymentProvider>;
