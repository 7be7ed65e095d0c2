// --- File: crates/bacs_checkout_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Stripe Config ---
// Secrets are written as "secret_from_env" in config files and injected at load time.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StripeConfig {
    /// Base URL of the Stripe REST API, without the `/v1` suffix.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Optional `Stripe-Version` header sent with every API call.
    #[serde(default)]
    pub api_version: Option<String>,
    pub publishable_key: String, // STRIPE_PUBLISHABLE_KEY
    pub secret_key: String,      // STRIPE_SECRET_KEY
    /// Webhook signing secret (whsec_...). Without it webhooks are accepted unverified.
    #[serde(default)]
    pub webhook_secret: Option<String>, // STRIPE_WEBHOOK_SECRET
    /// Public origin of the static site, used for success and cancel URLs.
    pub domain: String, // DOMAIN
    #[serde(default = "default_payment_method_types")]
    pub payment_method_types: Vec<String>,
    #[serde(default)]
    pub currency: Option<String>,
    /// Name given to the Customer created for each session.
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default = "default_webhook_tolerance_secs")]
    pub webhook_tolerance_secs: u64,
    #[serde(default = "default_max_webhook_body_bytes")]
    pub max_webhook_body_bytes: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://api.stripe.com".to_string()
}

fn default_payment_method_types() -> Vec<String> {
    vec!["bacs_debit".to_string()]
}

fn default_webhook_tolerance_secs() -> u64 {
    300
}

fn default_max_webhook_body_bytes() -> usize {
    64 * 1024
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl StripeConfig {
    /// Returns the webhook secret only when it is set to a usable value.
    pub fn webhook_signing_secret(&self) -> Option<&str> {
        self.webhook_secret
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != crate::SECRET_MARKER)
    }
}

// --- Static Files Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StaticFilesConfig {
    pub dir: String, // STATIC_DIR
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_stripe: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub stripe: Option<StripeConfig>,
    #[serde(default)]
    pub static_files: Option<StaticFilesConfig>,
}
