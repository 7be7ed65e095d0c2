// --- File: crates/bacs_checkout_common/src/error.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

/// The base error type shared by all crates of the service.
///
/// Feature crates keep their own error enums and implement
/// `From<TheirError> for AppError` so handlers can render one response shape.
#[derive(Error, Debug)]
pub enum AppError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during authentication (bad webhook signature)
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// An upstream service answered with an error
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
        status_code: Option<u16>,
    },

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for AppError {
    fn status_code(&self) -> u16 {
        match self {
            AppError::HttpError(_) => 502,
            AppError::ParseError(_) => 400,
            AppError::ConfigError(_) => 500,
            AppError::AuthError(_) => 400,
            AppError::ValidationError(_) => 400,
            AppError::ExternalServiceError { status_code, .. } => match status_code {
                Some(code) if (400..500).contains(code) => *code,
                _ => 502,
            },
            AppError::InternalError(_) => 500,
        }
    }
}

/// A trait for adding context to errors.
pub trait Context<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T, AppError>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Adds context to an error with a lazy context provider.
    fn with_context<C, F>(self, f: F) -> Result<T, AppError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, AppError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| internal_error(format!("{}: {}", context, error)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, AppError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| internal_error(format!("{}: {}", f(), error)))
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> AppError {
    AppError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> AppError {
    AppError::ValidationError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(
    service_name: &str,
    status_code: Option<u16>,
    message: T,
) -> AppError {
    AppError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
        status_code,
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> AppError {
    AppError::InternalError(message.to_string())
}

/// Renders `{"error": {"message", "code"}}`, which `client/script.js` shows to the user.
///
/// Server-side failures are logged at ERROR, rejected requests at WARN.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = self.to_string();

        if status.is_server_error() {
            error!(status = status.as_u16(), "{}", message);
        } else {
            warn!(status = status.as_u16(), "{}", message);
        }

        let body = Json(json!({
            "error": {
                "message": message,
                "code": status.as_u16(),
            }
        }));
        (status, body).into_response()
    }
}
