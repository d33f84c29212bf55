//! # Request Handlers
//!
//! Axum request handlers for the storefront API.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use shop_core::{ShopError, Verification, DEMO_IDENTITY};
use shop_stripe::SIGNATURE_HEADER;
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Demo purchase request
#[derive(Debug, Default, Deserialize)]
pub struct DemoPurchaseRequest {
    /// Buyer email (optional)
    #[serde(default)]
    pub email: Option<String>,
}

/// Session verification request
#[derive(Debug, Default, Deserialize)]
pub struct VerifySessionRequest {
    /// Stripe checkout session ID from the success redirect
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Download query string
#[derive(Debug, Default, Deserialize)]
pub struct ProtectedFileQuery {
    #[serde(default)]
    pub token: Option<String>,
    /// Resource index; non-numeric values count as 0
    #[serde(default)]
    pub file: Option<String>,
}

impl ProtectedFileQuery {
    fn index(&self) -> u32 {
        self.file
            .as_deref()
            .and_then(|f| f.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// Token issuance response.
///
/// `ok: false` covers both "not paid" and "provider unavailable".
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl TokenResponse {
    pub fn granted(token: impl Into<String>) -> Self {
        Self {
            ok: true,
            token: Some(token.into()),
        }
    }

    pub fn denied() -> Self {
        Self {
            ok: false,
            token: None,
        }
    }
}

/// Checkout creation response
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckoutResponse {
    /// Hosted checkout URL (redirect the buyer here)
    pub url: String,
}

/// Webhook acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

fn status_of(err: &ShopError) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn shop_error_to_response(err: ShopError) -> (StatusCode, Json<ErrorResponse>) {
    (status_of(&err), Json(ErrorResponse::new(err.to_string())))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "storefront-gate",
        "version": env!("CARGO_PKG_VERSION"),
        "payments": state.payments.provider_name().unwrap_or("disabled"),
        "grants": state.store.len()
    }))
}

/// Issue a grant without payment
#[instrument(skip(state, body))]
pub async fn demo_purchase(
    State(state): State<AppState>,
    body: Option<Json<DemoPurchaseRequest>>,
) -> Result<Json<TokenResponse>, (StatusCode, Json<ErrorResponse>)> {
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let token = state
        .issuer
        .issue_with_fallback(request.email.as_deref(), DEMO_IDENTITY)
        .map_err(|e| {
            error!("Demo grant failed: {}", e);
            shop_error_to_response(e)
        })?;

    info!("Demo purchase completed");
    Ok(Json(TokenResponse::granted(token.into_string())))
}

/// Create a Stripe checkout session for the single product
#[instrument(skip(state))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
) -> Result<Json<CheckoutResponse>, (StatusCode, Json<ErrorResponse>)> {
    let session = state.payments.create_checkout().await.map_err(|e| {
        error!("Failed to create checkout: {}", e);
        shop_error_to_response(e)
    })?;

    info!("Created checkout session: {}", session.session_id);
    Ok(Json(CheckoutResponse {
        url: session.checkout_url,
    }))
}

/// Exchange a paid checkout session for a token
#[instrument(skip(state, body))]
pub async fn verify_session(
    State(state): State<AppState>,
    body: Option<Json<VerifySessionRequest>>,
) -> Result<Json<TokenResponse>, (StatusCode, Json<ErrorResponse>)> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let session_id = request.session_id.unwrap_or_default();

    let verification = state
        .payments
        .verify_session(&session_id)
        .await
        .map_err(|e| {
            error!("Verification failed while issuing grant: {}", e);
            shop_error_to_response(e)
        })?;

    Ok(Json(match verification {
        Verification::Granted(token) => TokenResponse::granted(token.into_string()),
        Verification::NotPaid | Verification::Unavailable => TokenResponse::denied(),
    }))
}

/// Handle a Stripe webhook delivery.
///
/// Errors are returned as plain text so Stripe's dashboard shows them.
#[instrument(skip(state, headers, body), fields(bytes = body.len()))]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !state.payments.webhook_configured() {
        return (StatusCode::BAD_REQUEST, "webhook not configured").into_response();
    }

    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        warn!("Webhook without signature header");
        return (
            StatusCode::BAD_REQUEST,
            "Webhook Error: Missing Stripe-Signature header",
        )
            .into_response();
    };

    match state.payments.handle_webhook(&body, signature).await {
        Ok(outcome) => {
            info!("Webhook handled: {:?}", outcome);
            Json(WebhookAck { received: true }).into_response()
        }
        Err(ShopError::NotConfigured(_)) => {
            (StatusCode::BAD_REQUEST, "webhook not configured").into_response()
        }
        Err(e) if e.is_webhook_rejection() => {
            (StatusCode::BAD_REQUEST, format!("Webhook Error: {}", e)).into_response()
        }
        Err(e) => {
            error!("Webhook processing failed: {}", e);
            (status_of(&e), e.to_string()).into_response()
        }
    }
}

/// Token-gated download
#[instrument(skip(state, query), fields(file = query.index()))]
pub async fn protected_file(
    State(state): State<AppState>,
    Query(query): Query<ProtectedFileQuery>,
) -> Response {
    let token = query.token.as_deref().unwrap_or_default();

    match state.gate.authorize(token, query.index()) {
        Ok(resource) => (
            [
                (header::CONTENT_TYPE, resource.content_type.to_string()),
                (header::CONTENT_DISPOSITION, resource.content_disposition()),
            ],
            resource.body,
        )
            .into_response(),
        Err(e) => (StatusCode::UNAUTHORIZED, e.to_string()).into_response(),
    }
}
