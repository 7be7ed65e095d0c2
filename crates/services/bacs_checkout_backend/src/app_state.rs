// --- File: crates/services/bacs_checkout_backend/src/app_state.rs ---
use bacs_checkout_config::AppConfig;
use std::sync::Arc;
use tracing::info;

#[cfg(feature = "stripe")]
use {
    bacs_checkout_common::is_stripe_enabled,
    bacs_checkout_stripe::{StripeCheckoutService, StripeError, StripeState},
    tracing::warn,
};

/// State shared by the router: the loaded configuration and the state of
/// every feature that is switched on.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,

    /// Stripe Checkout state, `None` when `use_stripe` is off or `[stripe]` is missing.
    #[cfg(feature = "stripe")]
    pub stripe: Option<Arc<StripeState>>,
}

impl AppState {
    /// Builds the state from configuration, creating the Stripe client when enabled.
    #[cfg(feature = "stripe")]
    pub fn new(config: Arc<AppConfig>) -> Result<Self, StripeError> {
        let stripe = match config.stripe.as_ref() {
            Some(stripe_config) if is_stripe_enabled(&config) => {
                let service = StripeCheckoutService::from_config(stripe_config)?;
                if stripe_config.webhook_signing_secret().is_none() {
                    warn!("STRIPE_WEBHOOK_SECRET is not set; webhook events will not be verified");
                }
                info!("Stripe Checkout enabled (domain: {})", stripe_config.domain);
                Some(Arc::new(StripeState::new(
                    Arc::new(stripe_config.clone()),
                    Arc::new(service),
                )))
            }
            None if config.use_stripe => {
                warn!("use_stripe is set but there is no [stripe] section; Stripe Checkout disabled");
                None
            }
            _ => {
                info!("Stripe Checkout disabled");
                None
            }
        };

        Ok(Self { config, stripe })
    }

    #[cfg(not(feature = "stripe"))]
    pub fn new(config: Arc<AppConfig>) -> Result<Self, std::convert::Infallible> {
        info!("Built without the stripe feature; only static files are served");
        Ok(Self { config })
    }

    /// State with an injected Stripe gateway, used by tests.
    #[cfg(feature = "stripe")]
    pub fn with_stripe(config: Arc<AppConfig>, stripe: Option<Arc<StripeState>>) -> Self {
        Self { config, stripe }
    }
}
