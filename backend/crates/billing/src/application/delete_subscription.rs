//! Delete Subscription Use Case

use crate::domain::payer::PayerProxy;
use crate::domain::repository::SubscriptionRepository;
use crate::error::{BillingError, BillingResult};
use std::sync::Arc;

/// Delete Subscription Use Case
pub struct DeleteSubscriptionUseCase<R>
where
    R: SubscriptionRepository,
{
    repo: Arc<R>,
    payer: Arc<dyn PayerProxy>,
}

impl<R> DeleteSubscriptionUseCase<R>
where
    R: SubscriptionRepository,
{
    pub fn new(repo: Arc<R>, payer: Arc<dyn PayerProxy>) -> Self {
        Self { repo, payer }
    }

    /// Cancel remotely, then soft-delete locally
    ///
    /// Deleting an absent subscription succeeds without touching the
    /// processor. A processor failure leaves the local row untouched.
    pub async fn execute(&self, user_id: &str, kind: &str) -> BillingResult<()> {
        let Some(subscription) = self.repo.find_by_user_and_type(user_id, kind).await? else {
            tracing::debug!("No subscription to delete");
            return Ok(());
        };

        self.payer
            .delete(&subscription.remote_id)
            .await
            .map_err(BillingError::RemoteDelete)?;

        tracing::info!(remote_id = %subscription.remote_id, "Removed subscription from processor");

        self.repo
            .soft_delete_subscription(subscription.id)
            .await
            .inspect_err(|e| {
                tracing::warn!(error = %e, record = ?subscription, "Error while deleting subscription");
            })?;

        tracing::info!(subscription_id = %subscription.id, "Removed subscription from store");
        Ok(())
    }
}
