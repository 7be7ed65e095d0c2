// --- File: crates/bacs_checkout_stripe/src/routes.rs ---

use crate::handlers::{
    create_checkout_session_handler,
    get_checkout_session_handler,
    get_config_handler,
    stripe_webhook_handler,
    StripeState,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Creates a router containing all routes for the Stripe Checkout feature.
pub fn routes(stripe_state: Arc<StripeState>) -> Router {
    let max_webhook_body = stripe_state.config.max_webhook_body_bytes;

    Router::new()
        .route("/config", get(get_config_handler))
        .route("/checkout-session", get(get_checkout_session_handler))
        .route(
            "/create-checkout-session",
            post(create_checkout_session_handler),
        )
        // Server-to-server notifications from Stripe
        .route(
            "/webhook",
            post(stripe_webhook_handler).layer(DefaultBodyLimit::max(max_webhook_body)),
        )
        .with_state(stripe_state)
}
