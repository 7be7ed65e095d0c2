// --- File: crates/bacs_checkout_common/src/http/client.rs ---
use reqwest::{Client, Error as ReqwestError};
use std::time::Duration;

/// User agent sent with every outbound call
pub const USER_AGENT: &str = concat!("bacs-checkout/", env!("CARGO_PKG_VERSION"));

/// Creates an outbound HTTP client.
///
/// # Arguments
///
/// * `timeout_secs` - Whole-request timeout
/// * `follow_redirects` - Whether the client should follow redirects
pub fn create_client(timeout_secs: u64, follow_redirects: bool) -> Result<Client, ReqwestError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
        .user_agent(USER_AGENT)
        .redirect(if follow_redirects {
            reqwest::redirect::Policy::default()
        } else {
            reqwest::redirect::Policy::none()
        })
        .build()
}
