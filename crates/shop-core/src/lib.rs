//! # shop-core
//!
//! Core types and bookkeeping for the storefront-gate download shop.
//!
//! This crate provides:
//! - `Grant` and `AccessToken` for time-limited download rights
//! - `TokenStore`, the in-memory token → grant mapping
//! - `GrantIssuer` for minting tokens
//! - `AccessGate` for authorizing downloads
//! - `PaymentProvider` trait and `PaymentConfirmation` for turning payments into grants
//! - `ShopError` for typed error handling
//!
//! ## Flow
//!
//! ```text
//!  demo purchase ──┐
//!  verify session ─┼──► GrantIssuer ──► TokenStore ◄── AccessGate ◄── GET /protected-file
//!  webhook ────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use shop_core::{AccessGate, GrantIssuer, TokenStore};
//!
//! let store = TokenStore::new();
//! let issuer = GrantIssuer::new(store.clone());
//! let gate = AccessGate::new(store);
//!
//! let token = issuer.issue(Some("a@b.com"))?;
//! let resource = gate.authorize(token.as_str(), 0)?;
//! assert_eq!(resource.content_type, "application/pdf");
//! ```

pub mod confirmation;
pub mod error;
pub mod gate;
pub mod grant;
pub mod issuer;
pub mod provider;
pub mod resource;
pub mod session;
pub mod store;

// Re-exports for convenience
pub use confirmation::{PaymentConfirmation, Verification, WebhookOutcome};
pub use error::{ShopError, ShopResult};
pub use gate::AccessGate;
pub use grant::{AccessToken, Grant, DEFAULT_RESOURCES, GRANT_TTL_HOURS, TOKEN_BYTES};
pub use issuer::{GrantIssuer, BUYER_IDENTITY, DEMO_IDENTITY};
pub use provider::{BoxedPaymentProvider, PaymentProvider};
pub use resource::{Resource, DEMO_PDF};
pub use session::{
    CheckoutSession, PaymentStatus, SessionDetails, WebhookEvent, WebhookEventType,
};
pub use store::TokenStore;
