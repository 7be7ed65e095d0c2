// --- File: crates/bacs_checkout_stripe/src/logic.rs ---
use bacs_checkout_config::StripeConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::StripeError;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Placeholder Stripe replaces with the real session id on redirect.
pub const CHECKOUT_SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

// --- Data Structures ---

/// Response of `GET /config`: what Stripe.js needs to initialise.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ConfigResponse {
    #[cfg_attr(feature = "openapi", schema(example = "pk_test_51H..."))]
    pub public_key: String,
}

/// Body the browser posts to `POST /create-checkout-session`. Every field is optional.
#[derive(Deserialize, Debug, Default, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateCheckoutSessionRequest {
    /// Two-letter language of the browser, forwarded as the Checkout locale.
    #[cfg_attr(feature = "openapi", schema(example = "en"))]
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateCheckoutSessionResponse {
    #[cfg_attr(feature = "openapi", schema(example = "cs_test_a1..."))]
    pub session_id: String,
}

/// Query of `GET /checkout-session`; the success page passes the id it got from Stripe.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct CheckoutSessionQuery {
    #[cfg_attr(feature = "openapi", param(example = "cs_test_a1..."))]
    pub session_id: Option<String>,
}

/// Body returned to Stripe once an event has been handled.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct WebhookAck {
    pub status: String,
}

impl WebhookAck {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

/// Everything needed to open a setup-mode Checkout Session.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupSessionParams {
    pub customer_id: String,
    pub payment_method_types: Vec<String>,
    pub success_url: String,
    pub cancel_url: String,
    pub currency: Option<String>,
    pub locale: Option<String>,
}

/// The fields of a freshly created Checkout Session we care about.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CreatedCheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

/// Represents the `data` field within a Stripe Event.
#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StripeEventData {
    /// The object the event is about; its shape depends on the event type.
    pub object: serde_json::Value,
}

/// Represents the outer Stripe Event object.
#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StripeEvent {
    pub id: String,
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub livemode: bool,
    #[serde(rename = "type")]
    pub event_type: String, // e.g., "checkout.session.completed"
    pub data: StripeEventData,
}

/// The event types this integration reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventKind {
    CheckoutSessionCompleted,
    MandateUpdated,
    PaymentMethodAutomaticallyUpdated,
    Unhandled(String),
}

impl WebhookEventKind {
    pub fn from_event_type(event_type: &str) -> Self {
        match event_type {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            "mandate.updated" => Self::MandateUpdated,
            "payment_method.automatically_updated" => Self::PaymentMethodAutomaticallyUpdated,
            other => Self::Unhandled(other.to_string()),
        }
    }
}

// Partial views of `data.object`, used for logging only.
#[derive(Deserialize, Debug)]
struct CheckoutSessionView {
    id: String,
    mode: Option<String>,
    customer: Option<String>,
    setup_intent: Option<String>,
}

#[derive(Deserialize, Debug)]
struct MandateView {
    id: String,
    status: Option<String>,
    payment_method: Option<String>,
}

#[derive(Deserialize, Debug)]
struct PaymentMethodView {
    id: String,
    #[serde(rename = "type")]
    method_type: Option<String>,
    customer: Option<String>,
}

// --- Core Logic Functions ---

/// `success_url` for the session; Stripe appends the session id on redirect.
pub fn success_url(domain: &str) -> String {
    format!(
        "{}/success.html?session_id={}",
        domain.trim_end_matches('/'),
        CHECKOUT_SESSION_ID_PLACEHOLDER
    )
}

pub fn cancel_url(domain: &str) -> String {
    format!("{}/canceled.html", domain.trim_end_matches('/'))
}

/// Normalises the browser locale (`"en-GB"` → `"en"`); empty values are dropped.
pub fn normalize_locale(locale: Option<&str>) -> Option<String> {
    locale
        .and_then(|l| l.split(['-', '_']).next())
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
}

/// Builds the parameters of a setup-mode session for `customer_id`.
pub fn setup_session_params(
    stripe_config: &StripeConfig,
    customer_id: String,
    request: &CreateCheckoutSessionRequest,
) -> Result<SetupSessionParams, StripeError> {
    if stripe_config.payment_method_types.is_empty() {
        return Err(StripeError::ConfigError(
            "payment_method_types must not be empty".to_string(),
        ));
    }
    if stripe_config.domain.trim().is_empty() {
        return Err(StripeError::ConfigError("domain is not set".to_string()));
    }

    Ok(SetupSessionParams {
        customer_id,
        payment_method_types: stripe_config.payment_method_types.clone(),
        success_url: success_url(&stripe_config.domain),
        cancel_url: cancel_url(&stripe_config.domain),
        currency: stripe_config.currency.as_ref().map(|c| c.to_lowercase()),
        locale: normalize_locale(request.locale.as_deref()),
    })
}

/// Form body for `POST /v1/checkout/sessions`.
pub fn setup_session_form(params: &SetupSessionParams) -> Vec<(String, String)> {
    let mut form_body: Vec<(String, String)> = params
        .payment_method_types
        .iter()
        .map(|t| ("payment_method_types[]".to_string(), t.clone()))
        .collect();
    form_body.push(("mode".to_string(), "setup".to_string()));
    form_body.push(("customer".to_string(), params.customer_id.clone()));
    form_body.push(("success_url".to_string(), params.success_url.clone()));
    form_body.push(("cancel_url".to_string(), params.cancel_url.clone()));
    if let Some(currency) = &params.currency {
        form_body.push(("currency".to_string(), currency.clone()));
    }
    if let Some(locale) = &params.locale {
        form_body.push(("locale".to_string(), locale.clone()));
    }
    form_body
}

/// Form body for `POST /v1/customers`.
pub fn customer_form(name: Option<&str>) -> Vec<(String, String)> {
    name.filter(|n| !n.trim().is_empty())
        .map(|n| vec![("name".to_string(), n.to_string())])
        .unwrap_or_default()
}

/// Stripe session ids are `cs_test_...` / `cs_live_...`: ASCII alphanumerics and underscores.
pub fn validate_session_id(session_id: &str) -> Result<(), StripeError> {
    let valid = !session_id.is_empty()
        && session_id.len() <= 255
        && session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StripeError::InvalidSessionId(session_id.to_string()))
    }
}

/// Pulls `error.message` out of a Stripe error body, falling back to the raw text.
pub fn extract_error_message(body_text: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body_text) {
        Ok(json_body) => json_body
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .unwrap_or(body_text)
            .to_string(),
        Err(_) => body_text.to_string(),
    }
}

/// Parses a webhook body into a Stripe event.
pub fn parse_event(payload: &[u8]) -> Result<StripeEvent, StripeError> {
    serde_json::from_slice(payload).map_err(|e| StripeError::WebhookPayloadError(e.to_string()))
}

/// Processes a verified Stripe webhook event and reports which branch ran.
///
/// Never fails: Stripe only needs to know the event was received.
pub fn process_stripe_webhook(event: &StripeEvent) -> WebhookEventKind {
    let kind = WebhookEventKind::from_event_type(&event.event_type);
    info!(
        "Processing Stripe event {} of type {} (livemode: {})",
        event.id, event.event_type, event.livemode
    );

    match &kind {
        WebhookEventKind::CheckoutSessionCompleted => {
            match serde_json::from_value::<CheckoutSessionView>(event.data.object.clone()) {
                Ok(session) => info!(
                    "🔔 Checkout session completed: {} (mode: {:?}, customer: {:?}, setup_intent: {:?})",
                    session.id, session.mode, session.customer, session.setup_intent
                ),
                Err(e) => warn!("Checkout session completed, object unreadable: {}", e),
            }
        }
        WebhookEventKind::MandateUpdated => {
            match serde_json::from_value::<MandateView>(event.data.object.clone()) {
                Ok(mandate) => info!(
                    "🔔 Mandate updated: {} (status: {:?}, payment_method: {:?})",
                    mandate.id, mandate.status, mandate.payment_method
                ),
                Err(e) => warn!("Mandate updated, object unreadable: {}", e),
            }
        }
        WebhookEventKind::PaymentMethodAutomaticallyUpdated => {
            match serde_json::from_value::<PaymentMethodView>(event.data.object.clone()) {
                Ok(pm) => info!(
                    "🔔 Payment method automatically updated: {} (type: {:?}, customer: {:?})",
                    pm.id, pm.method_type, pm.customer
                ),
                Err(e) => warn!("Payment method automatically updated, object unreadable: {}", e),
            }
        }
        WebhookEventKind::Unhandled(event_type) => {
            info!("Received unhandled Stripe event type: {}", event_type);
        }
    }

    kind
}
