//! View Subscription Use Case

use crate::domain::entities::Subscription;
use crate::domain::repository::SubscriptionRepository;
use crate::error::{BillingError, BillingResult};
use auth::Identity;
use std::sync::Arc;

/// View Subscription Use Case
pub struct ViewSubscriptionUseCase<R>
where
    R: SubscriptionRepository,
{
    repo: Arc<R>,
}

impl<R> ViewSubscriptionUseCase<R>
where
    R: SubscriptionRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Fetch the active subscription of `kind`
    ///
    /// `owner` defaults to the caller. Asking for another user's record
    /// requires the admin flag and is refused before the store is queried.
    pub async fn execute(
        &self,
        caller: &Identity,
        kind: &str,
        owner: Option<&str>,
    ) -> BillingResult<Subscription> {
        let owner = owner.unwrap_or(caller.user_id());

        if owner != caller.user_id() && !caller.is_admin {
            return Err(BillingError::Unauthorized(
                "Not allowed to view subscriptions of other users".into(),
            ));
        }

        let subscription = self
            .repo
            .find_by_user_and_type(owner, kind)
            .await?
            .ok_or(BillingError::NotFound)?;

        tracing::debug!(subscription_id = %subscription.id, "Successfully retrieved subscription");
        Ok(subscription)
    }
}
