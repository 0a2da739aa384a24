//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic, the payment proxy and the store.

pub mod config;
pub mod create_or_modify;
pub mod delete_subscription;
pub mod list_subscriptions;
pub mod view_subscription;

// Re-exports
pub use config::BillingConfig;
pub use create_or_modify::{CreateOrModifyInput, CreateOrModifyUseCase};
pub use delete_subscription::DeleteSubscriptionUseCase;
pub use list_subscriptions::ListSubscriptionsUseCase;
pub use view_subscription::ViewSubscriptionUseCase;
