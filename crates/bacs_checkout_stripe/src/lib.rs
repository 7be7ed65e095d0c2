// --- File: crates/bacs_checkout_stripe/src/lib.rs ---

pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod routes;
pub mod service;
pub mod webhook;

// Re-export for main backend
pub use routes::routes;
pub use logic::{ConfigResponse, CreateCheckoutSessionRequest, CreateCheckoutSessionResponse}; // For OpenAPI
pub use handlers::StripeState;
pub use error::StripeError;
pub use service::{CheckoutGateway, StripeCheckoutService};
