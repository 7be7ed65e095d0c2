//! Feature flag handling.
//!
//! Features are switched twice: at compile time with cargo features
//! (`stripe`, `openapi`) and at runtime with the `use_*` flags in
//! `AppConfig`. A runtime feature counts as enabled only when its flag is
//! set *and* its configuration section is present.

#[cfg(feature = "stripe")]
use bacs_checkout_config::AppConfig;

/// Check if a feature is enabled at runtime based on configuration.
pub fn is_feature_enabled<T>(use_feature: bool, feature_config: Option<&T>) -> bool {
    use_feature && feature_config.is_some()
}

/// Check if Stripe Checkout is enabled at runtime.
#[cfg(feature = "stripe")]
pub fn is_stripe_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_stripe, config.stripe.as_ref())
}
