//! # Stripe Webhook Verification
//!
//! Stripe signs each delivery with HMAC-SHA256 over `"{timestamp}.{body}"`
//! and sends the result in the `Stripe-Signature` header:
//!
//! ```text
//! Stripe-Signature: t=1700000000,v1=5257a869...,v1=...
//! ```
//!
//! A delivery is accepted when any `v1` signature matches and the timestamp
//! is within [`TIMESTAMP_TOLERANCE_SECS`] of now.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use shop_core::{ShopError, ShopResult, WebhookEvent, WebhookEventType};
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Maximum clock skew accepted between Stripe and us
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> ShopResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => signatures.push(value.to_string()),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        ShopError::WebhookVerificationFailed("Missing timestamp in signature".to_string())
    })?;

    if signatures.is_empty() {
        return Err(ShopError::WebhookVerificationFailed(
            "No v1 signature found".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> ShopResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ShopError::WebhookVerificationFailed(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Verify a `Stripe-Signature` header against the raw body.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: DateTime<Utc>,
) -> ShopResult<()> {
    let parsed = parse_signature_header(header)?;

    let skew = now
        .timestamp()
        .checked_sub(parsed.timestamp)
        .map(i64::unsigned_abs);
    if !matches!(skew, Some(s) if s <= TIMESTAMP_TOLERANCE_SECS.unsigned_abs()) {
        return Err(ShopError::WebhookVerificationFailed(
            "Timestamp outside tolerance".to_string(),
        ));
    }

    let expected = compute_signature(secret, parsed.timestamp, payload)?;

    if parsed
        .signatures
        .iter()
        .any(|sig| constant_time_compare(sig, &expected))
    {
        Ok(())
    } else {
        Err(ShopError::WebhookVerificationFailed(
            "No signatures found matching the expected signature for payload".to_string(),
        ))
    }
}

/// Build a valid `Stripe-Signature` header for a payload.
///
/// Useful for local testing against the webhook endpoint.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> ShopResult<String> {
    let signature = compute_signature(secret, timestamp, payload)?;
    Ok(format!("t={},v1={}", timestamp, signature))
}

#[derive(Debug, Deserialize)]
struct StripeWebhookEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    created: i64,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Map<String, serde_json::Value>,
}

/// Parse a verified webhook body into a [`WebhookEvent`].
pub fn parse_event(payload: &[u8]) -> ShopResult<WebhookEvent> {
    let event: StripeWebhookEvent = serde_json::from_slice(payload)
        .map_err(|e| ShopError::WebhookParse(format!("Failed to parse webhook: {}", e)))?;

    debug!("Verified Stripe webhook: type={}", event.event_type);

    let object = event.data.object;

    let session_id = object
        .get("id")
        .and_then(|v| v.as_str())
        .map(String::from);

    let customer_email = object
        .get("customer_details")
        .and_then(|cd| cd.get("email"))
        .and_then(|v| v.as_str())
        .map(String::from);

    Ok(WebhookEvent {
        event_id: event.id,
        event_type: WebhookEventType::parse(&event.event_type),
        session_id,
        customer_email,
        created_at: DateTime::from_timestamp(event.created, 0).unwrap_or_else(Utc::now),
    })
}
