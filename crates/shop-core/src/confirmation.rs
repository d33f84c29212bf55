//! # Payment Confirmation
//!
//! Turns a confirmed payment into a grant. Two triggers lead here:
//!
//! 1. **Verification**: the buyer's browser polls with a checkout session ID
//!    and we ask the provider whether it was paid.
//! 2. **Webhook**: the provider pushes a signed `checkout.session.completed`
//!    event.
//!
//! Both end in [`GrantIssuer::issue`] with the payer's email.

use crate::error::{ShopError, ShopResult};
use crate::grant::AccessToken;
use crate::issuer::GrantIssuer;
use crate::provider::BoxedPaymentProvider;
use crate::session::{CheckoutSession, WebhookEvent, WebhookEventType};
use tracing::{debug, error, info, instrument, warn};

/// Result of polling a checkout session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Session paid; a grant was issued
    Granted(AccessToken),
    /// Session exists but is not paid
    NotPaid,
    /// Provider unconfigured or the lookup failed
    Unavailable,
}

impl Verification {
    /// The issued token, if any
    pub fn token(&self) -> Option<&AccessToken> {
        match self {
            Verification::Granted(token) => Some(token),
            _ => None,
        }
    }
}

/// Result of a verified webhook delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Checkout completed; a grant was issued
    Granted(AccessToken),
    /// Verified but not an event we act on
    Ignored(String),
}

/// Payment confirmation adapter.
///
/// `provider` is `None` when the shop runs without payment credentials.
#[derive(Clone)]
pub struct PaymentConfirmation {
    provider: Option<BoxedPaymentProvider>,
    issuer: GrantIssuer,
}

impl PaymentConfirmation {
    /// Create an adapter issuing grants through `issuer`
    pub fn new(provider: Option<BoxedPaymentProvider>, issuer: GrantIssuer) -> Self {
        Self { provider, issuer }
    }

    /// Whether a payment provider is configured
    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Whether a provider able to verify webhooks is configured
    pub fn webhook_configured(&self) -> bool {
        self.provider
            .as_ref()
            .is_some_and(|p| p.webhook_configured())
    }

    /// Name of the configured provider
    pub fn provider_name(&self) -> Option<&'static str> {
        self.provider.as_ref().map(|p| p.provider_name())
    }

    fn provider(&self) -> ShopResult<&BoxedPaymentProvider> {
        self.provider
            .as_ref()
            .ok_or_else(|| ShopError::NotConfigured("Payment provider".to_string()))
    }

    /// Create a hosted checkout session.
    ///
    /// Fails with `NotConfigured` when no provider is present.
    pub async fn create_checkout(&self) -> ShopResult<CheckoutSession> {
        let provider = self.provider()?;
        provider.create_checkout().await
    }

    /// Poll a checkout session and issue a grant if it is paid.
    ///
    /// Provider failures never propagate: they are logged and reported as
    /// [`Verification::Unavailable`]. Only a randomness failure while minting
    /// the token is returned as an error.
    #[instrument(skip(self))]
    pub async fn verify_session(&self, session_id: &str) -> ShopResult<Verification> {
        let Some(provider) = self.provider.as_ref() else {
            debug!("Verification requested with no provider configured");
            return Ok(Verification::Unavailable);
        };

        let details = match provider.retrieve_session(session_id).await {
            Ok(details) => details,
            Err(e) => {
                error!("Session lookup failed: {}", e);
                return Ok(Verification::Unavailable);
            }
        };

        if !details.payment_status.is_paid() {
            info!(
                "Session {} not paid: {:?}",
                details.session_id, details.payment_status
            );
            return Ok(Verification::NotPaid);
        }

        let token = self.issuer.issue(details.customer_email.as_deref())?;
        info!("Session {} verified as paid", details.session_id);
        Ok(Verification::Granted(token))
    }

    /// Verify a webhook delivery and act on it.
    ///
    /// Signature failures return an error before anything is issued.
    #[instrument(skip(self, payload, signature), fields(bytes = payload.len()))]
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> ShopResult<WebhookOutcome> {
        let provider = self.provider()?;

        let event = provider.verify_webhook(payload, signature).await.map_err(|e| {
            warn!("Webhook rejected: {}", e);
            e
        })?;

        info!(
            "Received webhook: type={}, id={}, created={}",
            event.event_type.as_str(),
            event.event_id,
            event.created_at.to_rfc3339()
        );

        self.dispatch(event)
    }

    fn dispatch(&self, event: WebhookEvent) -> ShopResult<WebhookOutcome> {
        match event.event_type {
            WebhookEventType::CheckoutCompleted => {
                let token = self.issuer.issue(event.customer_email.as_deref())?;
                info!(
                    "Issued grant for completed checkout {:?}",
                    event.session_id
                );
                Ok(WebhookOutcome::Granted(token))
            }
            WebhookEventType::Other(name) => {
                debug!("Ignoring webhook event: {}", name);
                Ok(WebhookOutcome::Ignored(name))
            }
        }
    }
}

impl std::fmt::Debug for PaymentConfirmation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfirmation")
            .field("provider", &self.provider_name())
            .finish()
    }
}
