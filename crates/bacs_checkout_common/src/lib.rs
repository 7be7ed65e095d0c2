// --- File: crates/bacs_checkout_common/src/lib.rs ---

// Declare modules within this crate
pub mod error;     // Error handling
pub mod http;      // HTTP utilities
pub mod logging;   // Logging utilities
pub mod features;  // Feature flag handling

// Re-export error types and utilities for easier access
pub use error::{
    AppError,
    HttpStatusCode,
    Context,
    config_error,
    validation_error,
    external_service_error,
    internal_error,
};

// Re-export HTTP utilities for easier access
pub use http::client::{
    USER_AGENT,
    create_client,
};

// Re-export logging utilities for easier access
pub use logging::{
    init,
    init_with_level,
};

// Re-export feature flag handling utilities for easier access
pub use features::is_feature_enabled;

#[cfg(feature = "stripe")]
pub use features::is_stripe_enabled;
