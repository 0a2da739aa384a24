//! Payment Proxy Implementations

use crate::domain::payer::{PayerError, PayerProxy};
use async_trait::async_trait;
use platform::stripe::{StripeClient, StripeError};

impl From<StripeError> for PayerError {
    fn from(err: StripeError) -> Self {
        match err {
            StripeError::Api { message, .. } => PayerError::Processor(message),
            other => PayerError::Processor(other.to_string()),
        }
    }
}

/// Proxy backed by the Stripe REST API
#[derive(Debug, Clone)]
pub struct StripeProxy {
    client: StripeClient,
}

impl StripeProxy {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self::with_client(StripeClient::new(secret_key))
    }

    pub fn with_client(client: StripeClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PayerProxy for StripeProxy {
    async fn create_customer(
        &self,
        user_id: &str,
        email: &str,
        payment_token: &str,
    ) -> Result<String, PayerError> {
        let customer = self
            .client
            .post_form(
                "/v1/customers",
                &[
                    ("email", email),
                    ("source", payment_token),
                    ("metadata[nf_id]", user_id),
                ],
            )
            .await?;
        Ok(customer.id)
    }

    async fn create(
        &self,
        customer_id: &str,
        plan: &str,
        _payment_token: &str,
    ) -> Result<String, PayerError> {
        // The token was attached to the customer as its default source.
        let subscription = self
            .client
            .post_form("/v1/subscriptions", &[("customer", customer_id), ("plan", plan)])
            .await?;
        Ok(subscription.id)
    }

    async fn update(
        &self,
        remote_id: &str,
        plan: &str,
        payment_token: &str,
    ) -> Result<String, PayerError> {
        let mut params = vec![("plan", plan)];
        if !payment_token.is_empty() {
            params.push(("source", payment_token));
        }

        let subscription = self
            .client
            .post_form(&format!("/v1/subscriptions/{remote_id}"), &params)
            .await?;
        Ok(subscription.id)
    }

    async fn delete(&self, remote_id: &str) -> Result<(), PayerError> {
        self.client
            .delete(&format!("/v1/subscriptions/{remote_id}"))
            .await?;
        Ok(())
    }
}

/// Fail-closed proxy: every operation fails with [`PayerError::NotConfigured`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorProxy;

#[async_trait]
impl PayerProxy for ErrorProxy {
    async fn create_customer(&self, _: &str, _: &str, _: &str) -> Result<String, PayerError> {
        Err(PayerError::NotConfigured)
    }

    async fn create(&self, _: &str, _: &str, _: &str) -> Result<String, PayerError> {
        Err(PayerError::NotConfigured)
    }

    async fn update(&self, _: &str, _: &str, _: &str) -> Result<String, PayerError> {
        Err(PayerError::NotConfigured)
    }

    async fn delete(&self, _: &str) -> Result<(), PayerError> {
        Err(PayerError::NotConfigured)
    }
}
