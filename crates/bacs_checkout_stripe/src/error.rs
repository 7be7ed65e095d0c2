// --- File: crates/bacs_checkout_stripe/src/error.rs ---
use axum::response::{IntoResponse, Response};
use bacs_checkout_common::{config_error, external_service_error, validation_error, AppError};
use thiserror::Error;

/// Stripe-specific error types.
#[derive(Error, Debug)]
pub enum StripeError {
    /// Error occurred during a Stripe API request
    #[error("Stripe API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the Stripe API
    #[error("Stripe API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// Error parsing Stripe API response
    #[error("Failed to parse Stripe API response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Missing or incomplete Stripe configuration
    #[error("Stripe configuration error: {0}")]
    ConfigError(String),

    /// Webhook signature verification failed
    #[error("Stripe webhook signature verification failed: {0}")]
    WebhookSignatureError(String),

    /// Webhook body is not a Stripe event
    #[error("Invalid Stripe webhook payload: {0}")]
    WebhookPayloadError(String),

    /// `sessionId` query parameter absent or empty
    #[error("Missing sessionId query parameter")]
    MissingSessionId,

    /// Session id contains characters Stripe never issues
    #[error("Invalid checkout session id: {0}")]
    InvalidSessionId(String),

    /// Request body from the browser could not be read
    #[error("Invalid request body: {0}")]
    InvalidRequestBody(String),
}

/// Convert StripeError to AppError
impl From<StripeError> for AppError {
    fn from(err: StripeError) -> Self {
        match err {
            StripeError::RequestError(e) => AppError::HttpError(format!("Stripe request error: {}", e)),
            StripeError::ApiError { status_code, message } => {
                external_service_error("Stripe API", Some(status_code), message)
            }
            StripeError::ParseError(e) => external_service_error(
                "Stripe API",
                None,
                format!("Unreadable response: {}", e),
            ),
            StripeError::ConfigError(msg) => config_error(format!("Stripe: {}", msg)),
            StripeError::WebhookSignatureError(msg) => {
                AppError::AuthError(format!("Stripe webhook signature error: {}", msg))
            }
            StripeError::WebhookPayloadError(msg) => {
                AppError::ParseError(format!("Stripe webhook payload: {}", msg))
            }
            StripeError::MissingSessionId => validation_error("sessionId query parameter is required"),
            StripeError::InvalidSessionId(id) => {
                validation_error(format!("Invalid checkout session id: {}", id))
            }
            StripeError::InvalidRequestBody(msg) => {
                validation_error(format!("Invalid request body: {}", msg))
            }
        }
    }
}

impl IntoResponse for StripeError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bacs_checkout_common::HttpStatusCode;

    fn status(err: StripeError) -> u16 {
        AppError::from(err).status_code()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status(StripeError::WebhookSignatureError("bad".into())), 400);
        assert_eq!(status(StripeError::WebhookPayloadError("bad".into())), 400);
        assert_eq!(status(StripeError::MissingSessionId), 400);
        assert_eq!(status(StripeError::InvalidSessionId("a/b".into())), 400);
        assert_eq!(status(StripeError::ConfigError("no key".into())), 500);
        assert_eq!(
            status(StripeError::ApiError {
                status_code: 404,
                message: "No such checkout.session".into()
            }),
            404
        );
        assert_eq!(
            status(StripeError::ApiError {
                status_code: 503,
                message: "unavailable".into()
            }),
            502
        );
    }

    #[test]
    fn test_api_error_keeps_vendor_message() {
        let err = AppError::from(StripeError::ApiError {
            status_code: 400,
            message: "No such customer: 'cus_x'".into(),
        });
        assert!(err.to_string().contains("No such customer: 'cus_x'"));
    }
}
