// --- File: crates/bacs_checkout_stripe/src/service.rs ---
use async_trait::async_trait;
use bacs_checkout_common::create_client;
use bacs_checkout_config::StripeConfig;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{error, info};

use crate::error::StripeError;
use crate::logic::{
    customer_form, extract_error_message, setup_session_form, validate_session_id,
    CreatedCheckoutSession, SetupSessionParams,
};

/// The calls this service makes to the payment provider.
///
/// Handlers only see this trait, so tests can swap in a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Creates a Customer and returns its id (`cus_...`).
    async fn create_customer(&self, name: Option<String>) -> Result<String, StripeError>;

    /// Creates a setup-mode Checkout Session.
    async fn create_setup_session(
        &self,
        params: SetupSessionParams,
    ) -> Result<CreatedCheckoutSession, StripeError>;

    /// Retrieves a Checkout Session exactly as Stripe returns it.
    async fn retrieve_session(&self, session_id: &str) -> Result<serde_json::Value, StripeError>;
}

#[derive(Deserialize, Debug)]
struct StripeCustomerApiResponse {
    id: String,
}

/// [`CheckoutGateway`] backed by the Stripe REST API.
#[derive(Clone)]
pub struct StripeCheckoutService {
    client: Client,
    api_base: String,
    secret_key: String,
    api_version: Option<String>,
}

impl StripeCheckoutService {
    pub fn new(client: Client, api_base: &str, secret_key: String, api_version: Option<String>) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key,
            api_version,
        }
    }

    /// Builds the service from configuration, with its own client and timeout.
    pub fn from_config(stripe_config: &StripeConfig) -> Result<Self, StripeError> {
        let secret_key = stripe_config.secret_key.trim();
        if secret_key.is_empty() || secret_key == bacs_checkout_config::SECRET_MARKER {
            return Err(StripeError::ConfigError(
                "secret key missing (set STRIPE_SECRET_KEY)".to_string(),
            ));
        }
        let client = create_client(stripe_config.request_timeout_secs, false)?;
        Ok(Self::new(
            client,
            &stripe_config.api_base,
            secret_key.to_string(),
            stripe_config.api_version.clone(),
        ))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.api_base, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.basic_auth(&self.secret_key, None::<&str>);
        match &self.api_version {
            Some(version) => request.header("Stripe-Version", version),
            None => request,
        }
    }

    /// Reads the body and maps non-2xx answers to [`StripeError::ApiError`].
    async fn read_body(response: Response) -> Result<String, StripeError> {
        let status = response.status();
        let body_text = response.text().await?;

        if status.is_success() {
            Ok(body_text)
        } else {
            let message = extract_error_message(&body_text);
            error!(
                "[Stripe] API request failed with HTTP status: {}. Message: {}",
                status, message
            );
            Err(StripeError::ApiError {
                status_code: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl CheckoutGateway for StripeCheckoutService {
    async fn create_customer(&self, name: Option<String>) -> Result<String, StripeError> {
        let response = self
            .authorize(self.client.post(self.url("customers")))
            .form(&customer_form(name.as_deref()))
            .send()
            .await?;
        let body_text = Self::read_body(response).await?;
        let customer: StripeCustomerApiResponse = serde_json::from_str(&body_text)?;
        info!("[Stripe] Created customer {}", customer.id);
        Ok(customer.id)
    }

    async fn create_setup_session(
        &self,
        params: SetupSessionParams,
    ) -> Result<CreatedCheckoutSession, StripeError> {
        info!(
            "[Stripe] Creating setup session for customer {} ({:?})",
            params.customer_id, params.payment_method_types
        );
        let response = self
            .authorize(self.client.post(self.url("checkout/sessions")))
            .form(&setup_session_form(&params))
            .send()
            .await?;
        let body_text = Self::read_body(response).await?;
        let session: CreatedCheckoutSession = serde_json::from_str(&body_text)?;
        info!("[Stripe] Checkout session {} created", session.id);
        Ok(session)
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<serde_json::Value, StripeError> {
        validate_session_id(session_id)?;
        info!("[Stripe] Retrieving checkout session {}", session_id);
        let response = self
            .authorize(
                self.client
                    .get(self.url(&format!("checkout/sessions/{}", session_id))),
            )
            .send()
            .await?;
        let body_text = Self::read_body(response).await?;
        Ok(serde_json::from_str(&body_text)?)
    }
}
