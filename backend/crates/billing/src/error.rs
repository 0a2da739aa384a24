//! Billing Error Types
//!
//! This module provides billing-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::payer::PayerError;

/// Billing-specific result type alias
pub type BillingResult<T> = Result<T, BillingError>;

/// Billing-specific error variants
///
/// Every handler collapses its failure into exactly one of these; the
/// HTTP status comes from [`BillingError::kind`].
#[derive(Debug, Error)]
pub enum BillingError {
    /// Request body is not valid JSON for the expected shape
    #[error("failed to decode payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// Request body decoded but required fields are empty
    #[error("Failed to provide a valid request: Missing fields: {}", .0.join(","))]
    MissingFields(Vec<&'static str>),

    /// Record failed the persistence validation gate
    #[error("Missing required fields: {}", .0.join(","))]
    InvalidRecord(Vec<&'static str>),

    /// Caller may not act on the requested record
    #[error("{0}")]
    Unauthorized(String),

    #[error("No subscription found")]
    NotFound,

    /// Processor refused to create a customer for the caller
    #[error("Failed to create new customer: {0}")]
    CustomerCreation(PayerError),

    /// Processor refused the plan/token combination
    #[error("Failed to create new subscription for plan {plan}: {source}")]
    RemoteCreate { plan: String, source: PayerError },

    /// Processor refused to move an existing subscription to a new plan
    #[error("Failed updating subscription {remote_id} to plan {plan}: {source}")]
    RemoteUpdate {
        remote_id: String,
        plan: String,
        source: PayerError,
    },

    /// Processor refused to cancel the subscription
    #[error("Error communicating with processor: {0}")]
    RemoteDelete(PayerError),

    /// The processor call succeeded but the local write did not
    #[error("Error while {0} db entry, but processor call was successful")]
    Unreconciled(&'static str),

    /// Store rejected a write (constraint, conflict)
    #[error("Store error: {0}")]
    Store(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl BillingError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            BillingError::Payload(_)
            | BillingError::MissingFields(_)
            | BillingError::RemoteCreate { .. }
            | BillingError::RemoteUpdate { .. }
            | BillingError::RemoteDelete(_) => ErrorKind::BadRequest,
            BillingError::Unauthorized(_) => ErrorKind::Unauthorized,
            BillingError::NotFound => ErrorKind::NotFound,
            BillingError::InvalidRecord(_)
            | BillingError::CustomerCreation(_)
            | BillingError::Unreconciled(_)
            | BillingError::Store(_)
            | BillingError::Database(_) => ErrorKind::InternalServerError,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            BillingError::Database(e) => {
                tracing::error!(error = %e, "Billing database error");
            }
            BillingError::Store(msg) => {
                tracing::error!(message = %msg, "Billing store error");
            }
            BillingError::Unreconciled(_) | BillingError::CustomerCreation(_) => {
                tracing::warn!(error = %self, "Billing processor/store mismatch");
            }
            BillingError::Unauthorized(_) => {
                tracing::warn!(error = %self, "Billing access denied");
            }
            _ => {
                tracing::info!(error = %self, "Billing request failed");
            }
        }
    }
}

impl From<BillingError> for AppError {
    fn from(err: BillingError) -> Self {
        AppError::new(err.kind(), err.to_string())
    }
}

impl IntoResponse for BillingError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}
