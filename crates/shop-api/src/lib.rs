//! # shop-api
//!
//! HTTP API layer for storefront-gate-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Purchase, verification and download endpoints
//! - Stripe webhook handler
//! - Background sweeper for expired grants
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/demo-purchase` | Issue a demo grant |
//! | POST | `/create-checkout-session` | Start a Stripe checkout |
//! | POST | `/verify-session` | Exchange a paid session for a token |
//! | POST | `/webhook` | Stripe webhook |
//! | GET | `/protected-file` | Token-gated download |

pub mod handlers;
pub mod routes;
pub mod state;
pub mod sweeper;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
