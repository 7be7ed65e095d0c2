// --- File: crates/bacs_checkout_stripe/src/doc.rs ---
#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;
use crate::logic::{
    CheckoutSessionQuery, ConfigResponse, CreateCheckoutSessionRequest,
    CreateCheckoutSessionResponse, StripeEvent, StripeEventData, WebhookAck,
};

#[utoipa::path(
    get,
    path = "/config",
    responses(
        (status = 200, description = "Publishable key for Stripe.js", body = ConfigResponse)
    ),
    tag = "Checkout"
)]
fn doc_get_config_handler() {}

#[utoipa::path(
    post,
    path = "/create-checkout-session",
    request_body(content = CreateCheckoutSessionRequest, example = json!({ "locale": "en" })),
    responses(
        (status = 200, description = "Setup-mode Checkout Session created", body = CreateCheckoutSessionResponse),
        (status = 400, description = "Bad Request"),
        (status = 502, description = "Stripe API unreachable or failing")
    ),
    tag = "Checkout"
)]
fn doc_create_checkout_session_handler() {}

#[utoipa::path(
    get,
    path = "/checkout-session",
    params(CheckoutSessionQuery),
    responses(
        (status = 200, description = "The Stripe Checkout Session object, unchanged", body = serde_json::Value),
        (status = 400, description = "sessionId missing or malformed"),
        (status = 404, description = "No such checkout session")
    ),
    tag = "Checkout"
)]
fn doc_get_checkout_session_handler() {}

#[utoipa::path(
    post,
    path = "/webhook",
    request_body = StripeEvent,
    params(("Stripe-Signature" = String, Header, description = "t=<unix time>,v1=<hex hmac>")),
    responses(
        (status = 200, description = "Event received and acknowledged", body = WebhookAck),
        (status = 400, description = "Invalid signature or payload"),
        (status = 413, description = "Payload too large")
    ),
    tag = "Stripe Webhooks"
)]
fn doc_stripe_webhook_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_get_config_handler,
        doc_create_checkout_session_handler,
        doc_get_checkout_session_handler,
        doc_stripe_webhook_handler
    ),
    components(
        schemas(
            ConfigResponse,
            CreateCheckoutSessionRequest, CreateCheckoutSessionResponse,
            StripeEvent, StripeEventData, WebhookAck
        )
    ),
    tags(
        (name = "Checkout", description = "Bacs Direct Debit mandate collection via Stripe Checkout"),
        (name = "Stripe Webhooks", description = "Stripe Server-to-Server Webhooks")
    )
)]
pub struct StripeApiDoc;
