//! # Checkout Session Types
//!
//! Provider-neutral views of checkout sessions and webhook events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A hosted checkout session the buyer is redirected to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider session ID
    pub session_id: String,

    /// Hosted checkout URL (redirect the buyer here)
    pub checkout_url: String,

    /// When the session expires on the provider side
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Payment state of a checkout session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    /// Funds captured
    Paid,
    /// Not yet paid
    Unpaid,
    /// Payment not required (e.g. 100% discount)
    NoPaymentRequired,
    /// Anything the provider adds later
    Other(String),
}

impl PaymentStatus {
    /// Parse the provider's status string
    pub fn parse(status: &str) -> Self {
        match status {
            "paid" => PaymentStatus::Paid,
            "unpaid" => PaymentStatus::Unpaid,
            "no_payment_required" => PaymentStatus::NoPaymentRequired,
            other => PaymentStatus::Other(other.to_string()),
        }
    }

    /// Only a `paid` session earns a grant
    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }
}

/// Retrieved state of a checkout session
#[derive(Debug, Clone)]
pub struct SessionDetails {
    pub session_id: String,
    pub payment_status: PaymentStatus,
    pub customer_email: Option<String>,
}

/// Webhook event types this shop distinguishes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebhookEventType {
    /// `checkout.session.completed`
    CheckoutCompleted,
    /// Anything else; acknowledged and ignored
    Other(String),
}

impl WebhookEventType {
    /// Map the provider's event type string
    pub fn parse(event_type: &str) -> Self {
        match event_type {
            "checkout.session.completed" => WebhookEventType::CheckoutCompleted,
            other => WebhookEventType::Other(other.to_string()),
        }
    }

    /// The provider's name for this event type
    pub fn as_str(&self) -> &str {
        match self {
            WebhookEventType::CheckoutCompleted => "checkout.session.completed",
            WebhookEventType::Other(name) => name,
        }
    }
}

/// A signature-verified webhook event
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    /// Provider event ID
    pub event_id: String,

    /// Event type
    pub event_type: WebhookEventType,

    /// Session ID when the event object is a checkout session
    pub session_id: Option<String>,

    /// Payer email from `customer_details.email`
    pub customer_email: Option<String>,

    /// Event creation time
    pub created_at: DateTime<Utc>,
}
