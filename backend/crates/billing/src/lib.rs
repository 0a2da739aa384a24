//! Billing Backend Module
//!
//! Subscriptions to paid plans, billed through an external payment processor.
//!
//! Clean Architecture structure:
//! - `domain/` - Subscription and User entities, repository traits, payment proxy port
//! - `application/` - Use cases (list, view, create-or-modify, delete)
//! - `infra/` - PostgreSQL and in-memory stores, Stripe and fail-closed proxies
//! - `presentation/` - Request context middleware, HTTP handlers, router
//!
//! ## Consistency Model
//! - The processor is called before the store; a store failure afterwards is
//!   logged for manual reconciliation and never rolled back
//! - At most one active subscription per `(user_id, type)`; concurrent first
//!   writes for the same key race and the store's unique index decides
//! - Deletes are soft and idempotent

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::BillingConfig;
pub use domain::payer::{PayerError, PayerProxy};
pub use error::{BillingError, BillingResult};
pub use infra::memory::MemoryBillingRepository;
pub use infra::payer::{ErrorProxy, StripeProxy};
pub use infra::postgres::PgBillingRepository;
pub use presentation::router::{billing_router, cors_layer};

// Re-export kernel error types for unified error handling
pub use kernel::error::{app_error::AppError, kind::ErrorKind};

#[cfg(test)]
mod tests;
