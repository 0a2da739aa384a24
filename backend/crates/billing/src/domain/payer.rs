//! Payment Proxy Port
//!
//! The processor is an opaque remote party with four operations. Concrete
//! proxies live in the infrastructure layer and are injected at startup.

use async_trait::async_trait;
use thiserror::Error;

/// Payment proxy failures
#[derive(Debug, Clone, Error)]
pub enum PayerError {
    /// Fail-closed default: no real processor is wired in
    #[error("no payer proxy provided")]
    NotConfigured,

    /// The processor answered with an error
    #[error("{0}")]
    Processor(String),
}

/// Port to the external payment processor
///
/// Implementations are shared by every request and must be safe for
/// concurrent use.
#[async_trait]
pub trait PayerProxy: Send + Sync {
    /// Register a customer for `user_id`, returning the processor customer id
    async fn create_customer(
        &self,
        user_id: &str,
        email: &str,
        payment_token: &str,
    ) -> Result<String, PayerError>;

    /// Subscribe `customer_id` to `plan`, returning the processor subscription id
    async fn create(
        &self,
        customer_id: &str,
        plan: &str,
        payment_token: &str,
    ) -> Result<String, PayerError>;

    /// Move `remote_id` to `plan`, returning the (possibly new) subscription id
    async fn update(
        &self,
        remote_id: &str,
        plan: &str,
        payment_token: &str,
    ) -> Result<String, PayerError>;

    /// Cancel `remote_id`
    async fn delete(&self, remote_id: &str) -> Result<(), PayerError>;
}
