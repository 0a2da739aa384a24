//! List Subscriptions Use Case

use crate::domain::entities::Subscription;
use crate::domain::repository::SubscriptionRepository;
use crate::error::BillingResult;
use std::sync::Arc;

/// List Subscriptions Use Case
pub struct ListSubscriptionsUseCase<R>
where
    R: SubscriptionRepository,
{
    repo: Arc<R>,
}

impl<R> ListSubscriptionsUseCase<R>
where
    R: SubscriptionRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Active subscriptions of `user_id`; an empty list is not an error
    pub async fn execute(&self, user_id: &str) -> BillingResult<Vec<Subscription>> {
        let subscriptions = self.repo.find_by_user(user_id).await?;

        tracing::debug!(
            count = subscriptions.len(),
            user_id = %user_id,
            "Found subscriptions"
        );

        Ok(subscriptions)
    }
}
