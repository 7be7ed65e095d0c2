// --- File: crates/bacs_checkout_stripe/src/handlers.rs ---
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    response::Json,
};
use bacs_checkout_config::StripeConfig;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::StripeError;
use crate::logic::{
    parse_event, process_stripe_webhook, setup_session_params, CheckoutSessionQuery,
    ConfigResponse, CreateCheckoutSessionRequest, CreateCheckoutSessionResponse, WebhookAck,
};
use crate::service::CheckoutGateway;
use crate::webhook::{verify_stripe_signature, SIGNATURE_HEADER};

// --- State for Stripe Handlers ---
#[derive(Clone)]
pub struct StripeState {
    pub config: Arc<StripeConfig>,
    pub gateway: Arc<dyn CheckoutGateway>,
}

impl StripeState {
    pub fn new(config: Arc<StripeConfig>, gateway: Arc<dyn CheckoutGateway>) -> Self {
        Self { config, gateway }
    }
}

/// `GET /config`: the publishable key for Stripe.js.
#[axum::debug_handler]
pub async fn get_config_handler(State(state): State<Arc<StripeState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        public_key: state.config.publishable_key.clone(),
    })
}

/// `GET /checkout-session?sessionId=`: the session object, passed through.
#[axum::debug_handler]
pub async fn get_checkout_session_handler(
    State(state): State<Arc<StripeState>>,
    Query(query): Query<CheckoutSessionQuery>,
) -> Result<Json<serde_json::Value>, StripeError> {
    let session_id = query
        .session_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| {
            warn!("Url param 'sessionId' is missing");
            StripeError::MissingSessionId
        })?;

    let session = state.gateway.retrieve_session(&session_id).await.map_err(|e| {
        error!("Retrieving checkout session {} failed: {}", session_id, e);
        e
    })?;
    Ok(Json(session))
}

/// `POST /create-checkout-session`: new Customer, then a setup-mode session for it.
///
/// The body is optional; when present it may carry the browser locale.
#[axum::debug_handler]
pub async fn create_checkout_session_handler(
    State(state): State<Arc<StripeState>>,
    body: Bytes,
) -> Result<Json<CreateCheckoutSessionResponse>, StripeError> {
    let request: CreateCheckoutSessionRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CreateCheckoutSessionRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| StripeError::InvalidRequestBody(e.to_string()))?
    };

    let customer_id = state
        .gateway
        .create_customer(state.config.customer_name.clone())
        .await?;
    let params = setup_session_params(&state.config, customer_id, &request)?;
    let session = state.gateway.create_setup_session(params).await?;

    match session.url.as_deref() {
        Some(url) => info!("Checkout session {} ready for redirect: {}", session.id, url),
        None => info!("Checkout session {} ready for redirect", session.id),
    }
    Ok(Json(CreateCheckoutSessionResponse {
        session_id: session.id,
    }))
}

/// `POST /webhook`: verify, parse, dispatch on the event type.
///
/// Without a configured signing secret the body is accepted unverified.
#[axum::debug_handler]
pub async fn stripe_webhook_handler(
    State(state): State<Arc<StripeState>>,
    headers: HeaderMap,
    body: Bytes, // Raw body for signature verification
) -> Result<Json<WebhookAck>, StripeError> {
    match state.config.webhook_signing_secret() {
        Some(secret) => {
            let sig_header = headers.get(SIGNATURE_HEADER).and_then(|h| h.to_str().ok());
            verify_stripe_signature(
                &body,
                sig_header,
                secret,
                state.config.webhook_tolerance_secs,
                Utc::now().timestamp(),
            )
            .map_err(|e| {
                warn!("⚠️ Webhook signature verification failed: {}", e);
                e
            })?;
        }
        None => warn!("No webhook signing secret configured; accepting event unverified"),
    }

    let event = parse_event(&body).map_err(|e| {
        warn!("Failed to deserialize Stripe webhook event: {}", e);
        e
    })?;
    process_stripe_webhook(&event);

    Ok(Json(WebhookAck::success()))
}
