//! # shop-stripe
//!
//! Stripe implementation of [`shop_core::PaymentProvider`].
//!
//! - **Checkout**: creates a hosted Checkout Session for the configured price
//! - **Verification**: retrieves a session to read its `payment_status`
//! - **Webhooks**: verifies the `Stripe-Signature` header and parses events
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shop_stripe::StripeProvider;
//! use shop_core::PaymentProvider;
//!
//! // Fails with NotConfigured when STRIPE_SECRET is unset
//! let stripe = StripeProvider::from_env()?;
//!
//! let session = stripe.create_checkout().await?;
//! // Redirect the buyer to session.checkout_url
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! let event = stripe.verify_webhook(&body, signature_header).await?;
//! if event.event_type == WebhookEventType::CheckoutCompleted {
//!     // issue a grant for event.customer_email
//! }
//! ```

pub mod checkout;
pub mod config;
pub mod webhook;

// Re-exports
pub use checkout::StripeProvider;
pub use config::StripeConfig;
pub use webhook::{
    signature_header, verify_signature, SIGNATURE_HEADER, TIMESTAMP_TOLERANCE_SECS,
};
