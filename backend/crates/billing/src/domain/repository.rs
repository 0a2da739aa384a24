//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::id::SubscriptionId;

use crate::domain::entities::{Subscription, User};
use crate::error::BillingResult;

/// Subscription repository trait
///
/// All lookups except [`find_unscoped`](LocalSubscriptionRepository::find_unscoped)
/// skip soft-deleted rows.
#[trait_variant::make(SubscriptionRepository: Send)]
pub trait LocalSubscriptionRepository {
    /// All active subscriptions owned by `user_id`
    async fn find_by_user(&self, user_id: &str) -> BillingResult<Vec<Subscription>>;

    /// The active subscription of `kind` owned by `user_id`, if any
    async fn find_by_user_and_type(
        &self,
        user_id: &str,
        kind: &str,
    ) -> BillingResult<Option<Subscription>>;

    /// Lookup by id including soft-deleted rows
    async fn find_unscoped(&self, id: SubscriptionId) -> BillingResult<Option<Subscription>>;

    /// Insert a new subscription (validation gate applies)
    async fn create_subscription(&self, subscription: &Subscription) -> BillingResult<()>;

    /// Persist `plan` / `remote_id` changes
    async fn update_subscription(&self, subscription: &Subscription) -> BillingResult<()>;

    /// Mark a subscription deleted without removing the row
    async fn soft_delete_subscription(&self, id: SubscriptionId) -> BillingResult<()>;
}

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    async fn find_user(&self, id: &str) -> BillingResult<Option<User>>;

    async fn create_user(&self, user: &User) -> BillingResult<()>;
}

/// Everything the billing handlers need from a store
pub trait BillingRepository:
    SubscriptionRepository + UserRepository + Clone + Send + Sync + 'static
{
}

impl<T> BillingRepository for T where
    T: SubscriptionRepository + UserRepository + Clone + Send + Sync + 'static
{
}
