//! # Stripe Checkout Sessions
//!
//! Creates and retrieves Checkout Sessions for the shop's single price, and
//! verifies webhook deliveries.

use crate::config::StripeConfig;
use crate::webhook::{parse_event, verify_signature};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use shop_core::{
    CheckoutSession, PaymentProvider, PaymentStatus, SessionDetails, ShopError, ShopResult,
    WebhookEvent,
};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

const PROVIDER: &str = "stripe";

/// Stripe Checkout provider
///
/// Uses Stripe's hosted checkout page; card data never touches this service.
pub struct StripeProvider {
    config: StripeConfig,
    client: Client,
}

impl StripeProvider {
    /// Create a new Stripe provider
    pub fn new(config: StripeConfig) -> ShopResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("storefront-gate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ShopError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> ShopResult<Self> {
        let config = StripeConfig::from_env()?;
        Self::new(config)
    }

    /// The active configuration
    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    fn checkout_form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("mode", "payment".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("line_items[0][price]", self.config.price_id.clone()),
            ("line_items[0][quantity]", "1".to_string()),
            ("success_url", self.config.success_url.clone()),
            ("cancel_url", self.config.cancel_url.clone()),
        ]
    }

    /// Read a Stripe response body, mapping non-2xx statuses to provider errors
    async fn read_body(response: reqwest::Response) -> ShopResult<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        if status.is_success() {
            return Ok(body);
        }

        error!("Stripe API error: status={}, body={}", status, body);

        let message = match serde_json::from_str::<StripeErrorResponse>(&body) {
            Ok(error_response) => error_response.error.message,
            Err(_) => format!("HTTP {}: {}", status, body),
        };

        Err(ShopError::Provider {
            provider: PROVIDER.to_string(),
            message,
        })
    }
}

fn validate_session_id(session_id: &str) -> ShopResult<()> {
    if session_id.is_empty() {
        return Err(ShopError::InvalidRequest("Missing session_id".to_string()));
    }
    if !session_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ShopError::InvalidRequest(format!(
            "Malformed session_id: {}",
            session_id
        )));
    }
    Ok(())
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    #[instrument(skip(self))]
    async fn create_checkout(&self) -> ShopResult<CheckoutSession> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);
        let idempotency_key = Uuid::new_v4().to_string();

        debug!("Creating Stripe checkout session for {}", self.config.price_id);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", &idempotency_key)
            .form(&self.checkout_form())
            .send()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        let body = Self::read_body(response).await?;

        let session: StripeCheckoutSessionResponse = serde_json::from_str(&body).map_err(|e| {
            ShopError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        info!(
            "Created Stripe checkout session: id={}, url={}",
            session.id, session.url
        );

        Ok(CheckoutSession {
            session_id: session.id,
            checkout_url: session.url,
            expires_at: session
                .expires_at
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
        })
    }

    #[instrument(skip(self))]
    async fn retrieve_session(&self, session_id: &str) -> ShopResult<SessionDetails> {
        validate_session_id(session_id)?;

        let url = format!(
            "{}/v1/checkout/sessions/{}",
            self.config.api_base_url, session_id
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .send()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        let body = Self::read_body(response).await?;

        let session: StripeSessionStatusResponse = serde_json::from_str(&body).map_err(|e| {
            ShopError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        debug!(
            "Retrieved session {}: payment_status={}",
            session.id, session.payment_status
        );

        Ok(SessionDetails {
            session_id: session.id,
            payment_status: PaymentStatus::parse(&session.payment_status),
            customer_email: session.customer_details.and_then(|cd| cd.email),
        })
    }

    #[instrument(skip(self, payload, signature))]
    async fn verify_webhook(&self, payload: &[u8], signature: &str) -> ShopResult<WebhookEvent> {
        let secret = self
            .config
            .webhook_secret
            .as_deref()
            .ok_or_else(|| ShopError::NotConfigured("Webhook".to_string()))?;

        verify_signature(payload, signature, secret, Utc::now())?;
        parse_event(payload)
    }

    fn webhook_configured(&self) -> bool {
        self.config.webhook_secret.is_some()
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionResponse {
    id: String,
    url: String,
    #[serde(default)]
    expires_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StripeSessionStatusResponse {
    id: String,
    payment_status: String,
    #[serde(default)]
    customer_details: Option<StripeCustomerDetails>,
}

#[derive(Debug, Deserialize)]
struct StripeCustomerDetails {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhook::signature_header;
    use serde_json::json;
    use shop_core::WebhookEventType;
    use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn provider_for(server: &MockServer, webhook_secret: Option<&str>) -> StripeProvider {
        let config = StripeConfig::new(
            "sk_test_abc",
            "price_123",
            webhook_secret.map(String::from),
        )
        .with_api_base_url(server.uri());
        StripeProvider::new(config).unwrap()
    }

    #[test]
    fn test_validate_session_id() {
        assert!(validate_session_id("cs_test_a1B2").is_ok());
        assert!(validate_session_id("").is_err());
        assert!(validate_session_id("../v1/charges").is_err());
        assert!(validate_session_id("cs_test?expand=x").is_err());
    }

    #[test]
    fn test_checkout_form() {
        let config = StripeConfig::new("sk_test_abc", "price_123", None);
        let provider = StripeProvider::new(config).unwrap();
        let form = provider.checkout_form();

        assert!(form.contains(&("mode", "payment".to_string())));
        assert!(form.contains(&("line_items[0][price]", "price_123".to_string())));
        assert!(form.contains(&("line_items[0][quantity]", "1".to_string())));
        assert!(form.contains(&(
            "success_url",
            "http://localhost:4242?session_id={CHECKOUT_SESSION_ID}".to_string()
        )));
        assert!(form.contains(&("cancel_url", "http://localhost:4242?canceled=true".to_string())));
    }

    #[test]
    fn test_checkout_form_custom_redirects() {
        let config = StripeConfig::new("sk_test_abc", "price_123", None).with_redirects(
            "https://shop.test/thanks?session_id={CHECKOUT_SESSION_ID}",
            "https://shop.test/",
        );
        let form = StripeProvider::new(config).unwrap().checkout_form();

        assert!(form.contains(&(
            "success_url",
            "https://shop.test/thanks?session_id={CHECKOUT_SESSION_ID}".to_string()
        )));
        assert!(form.contains(&("cancel_url", "https://shop.test/".to_string())));
    }

    #[tokio::test]
    async fn test_create_checkout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("Authorization", "Bearer sk_test_abc"))
            .and(header_exists("Idempotency-Key"))
            .and(body_string_contains("price_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_1",
                "url": "https://checkout.stripe.com/c/pay/cs_test_1",
                "expires_at": 1_700_086_400
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server, None).await;
        let session = provider.create_checkout().await.unwrap();

        assert_eq!(session.session_id, "cs_test_1");
        assert_eq!(session.checkout_url, "https://checkout.stripe.com/c/pay/cs_test_1");
        assert_eq!(session.expires_at.unwrap().timestamp(), 1_700_086_400);
    }

    #[tokio::test]
    async fn test_create_checkout_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "message": "No such price: 'price_123'",
                    "type": "invalid_request_error"
                }
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server, None).await;
        let err = provider.create_checkout().await.unwrap_err();

        match err {
            ShopError::Provider { provider, message } => {
                assert_eq!(provider, "stripe");
                assert!(message.contains("No such price"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_retrieve_paid_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_test_paid"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_paid",
                "payment_status": "paid",
                "customer_details": { "email": "buyer@example.com" }
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server, None).await;
        let details = provider.retrieve_session("cs_test_paid").await.unwrap();

        assert!(details.payment_status.is_paid());
        assert_eq!(details.customer_email.as_deref(), Some("buyer@example.com"));
    }

    #[tokio::test]
    async fn test_retrieve_unpaid_session_without_details() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_test_open"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_open",
                "payment_status": "unpaid",
                "customer_details": null
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server, None).await;
        let details = provider.retrieve_session("cs_test_open").await.unwrap();

        assert_eq!(details.payment_status, PaymentStatus::Unpaid);
        assert!(details.customer_email.is_none());
    }

    #[tokio::test]
    async fn test_retrieve_unknown_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let provider = provider_for(&server, None).await;
        assert!(matches!(
            provider.retrieve_session("cs_missing").await,
            Err(ShopError::Provider { .. })
        ));
    }

    #[tokio::test]
    async fn test_network_error() {
        let config = StripeConfig::new("sk_test_abc", "price_123", None)
            .with_api_base_url("http://127.0.0.1:9");
        let provider = StripeProvider::new(config).unwrap();

        assert!(matches!(
            provider.create_checkout().await,
            Err(ShopError::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_verify_webhook() {
        let server = MockServer::start().await;
        let provider = provider_for(&server, Some("whsec_test")).await;
        let payload = serde_json::to_vec(&json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "created": 1_700_000_000,
            "data": { "object": { "id": "cs_1", "customer_details": { "email": "a@b.com" } } }
        }))
        .unwrap();
        let header = signature_header("whsec_test", Utc::now().timestamp(), &payload).unwrap();

        let event = provider.verify_webhook(&payload, &header).await.unwrap();
        assert_eq!(event.event_type, WebhookEventType::CheckoutCompleted);
        assert_eq!(event.customer_email.as_deref(), Some("a@b.com"));
    }

    #[tokio::test]
    async fn test_verify_webhook_without_secret() {
        let server = MockServer::start().await;
        let provider = provider_for(&server, None).await;

        assert!(!provider.webhook_configured());
        assert!(matches!(
            provider.verify_webhook(b"{}", "t=1,v1=00").await,
            Err(ShopError::NotConfigured(_))
        ));
    }
}
