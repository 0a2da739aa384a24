//! Create-or-Modify Subscription Use Case
//!
//! Keyed by `(caller, type)`: creates the subscription on first write and
//! moves it to the requested plan on later writes. The processor is always
//! called before the store; a store failure after a successful processor
//! call is reported and logged for reconciliation, never rolled back.

use crate::domain::entities::{Subscription, User};
use crate::domain::payer::PayerProxy;
use crate::domain::repository::{SubscriptionRepository, UserRepository};
use crate::error::{BillingError, BillingResult};
use auth::Identity;
use std::sync::Arc;

/// Input DTO for create-or-modify
#[derive(Debug, Clone)]
pub struct CreateOrModifyInput {
    pub kind: String,
    pub plan: String,
    /// Client-side processor token (`stripe_key` on the wire)
    pub payment_token: String,
}

impl CreateOrModifyInput {
    /// Reject empty required fields, naming all of them
    pub fn validate(&self) -> BillingResult<()> {
        let mut missing = Vec::new();
        if self.payment_token.is_empty() {
            missing.push("stripe_key");
        }
        if self.plan.is_empty() {
            missing.push("plan");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(BillingError::MissingFields(missing))
        }
    }
}

/// Create-or-Modify Use Case
pub struct CreateOrModifyUseCase<R>
where
    R: SubscriptionRepository + UserRepository,
{
    repo: Arc<R>,
    payer: Arc<dyn PayerProxy>,
}

impl<R> CreateOrModifyUseCase<R>
where
    R: SubscriptionRepository + UserRepository,
{
    pub fn new(repo: Arc<R>, payer: Arc<dyn PayerProxy>) -> Self {
        Self { repo, payer }
    }

    pub async fn execute(
        &self,
        caller: &Identity,
        input: CreateOrModifyInput,
    ) -> BillingResult<Subscription> {
        input.validate()?;

        // No lock is held between this lookup and the write below; two
        // concurrent first writes for one key both reach the processor.
        let existing = self
            .repo
            .find_by_user_and_type(caller.user_id(), &input.kind)
            .await?;

        match existing {
            None => {
                tracing::debug!("Starting to create new subscription");
                self.create(caller, &input).await
            }
            Some(existing) => {
                tracing::debug!(old_plan = %existing.plan, "Starting to update subscription");
                self.update(existing, &input).await
            }
        }
    }

    async fn create(
        &self,
        caller: &Identity,
        input: &CreateOrModifyInput,
    ) -> BillingResult<Subscription> {
        let customer_id = self.resolve_customer(caller, &input.payment_token).await?;

        let remote_id = self
            .payer
            .create(&customer_id, &input.plan, &input.payment_token)
            .await
            .map_err(|source| {
                tracing::info!(error = %source, "Failed to create subscription with processor");
                BillingError::RemoteCreate {
                    plan: input.plan.clone(),
                    source,
                }
            })?;

        let subscription = match Subscription::new(
            caller.user_id(),
            input.kind.as_str(),
            input.plan.as_str(),
            remote_id.as_str(),
        ) {
            Ok(subscription) => subscription,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    user_id = %caller.user_id(),
                    "type" = %input.kind,
                    plan = %input.plan,
                    remote_id = %remote_id,
                    "Processor returned an unusable subscription"
                );
                return Err(BillingError::Unreconciled("creating"));
            }
        };

        if let Err(e) = self.repo.create_subscription(&subscription).await {
            tracing::warn!(
                error = %e,
                record = ?subscription,
                "Failed to create new subscription after successful processor call"
            );
            return Err(BillingError::Unreconciled("creating"));
        }

        tracing::info!(
            subscription_id = %subscription.id,
            remote_id = %subscription.remote_id,
            "Created subscription"
        );
        Ok(subscription)
    }

    async fn update(
        &self,
        mut subscription: Subscription,
        input: &CreateOrModifyInput,
    ) -> BillingResult<Subscription> {
        let remote_id = self
            .payer
            .update(&subscription.remote_id, &input.plan, &input.payment_token)
            .await
            .map_err(|source| {
                tracing::info!(error = %source, "Failed to update subscription with processor");
                BillingError::RemoteUpdate {
                    remote_id: subscription.remote_id.clone(),
                    plan: input.plan.clone(),
                    source,
                }
            })?;

        subscription.apply_change(input.plan.as_str(), remote_id);

        if let Err(e) = self.repo.update_subscription(&subscription).await {
            tracing::warn!(
                error = %e,
                record = ?subscription,
                "Failed to update subscription after successful processor call"
            );
            return Err(BillingError::Unreconciled("updating"));
        }

        tracing::info!(subscription_id = %subscription.id, "Updated subscription");
        Ok(subscription)
    }

    /// Processor customer id of the caller, registering one on first use
    async fn resolve_customer(&self, caller: &Identity, payment_token: &str) -> BillingResult<String> {
        if let Some(user) = self.repo.find_user(caller.user_id()).await? {
            return Ok(user.remote_id);
        }

        let customer_id = self
            .payer
            .create_customer(caller.user_id(), caller.email(), payment_token)
            .await
            .map_err(|e| {
                tracing::info!(error = %e, "Failed to create customer with processor");
                BillingError::CustomerCreation(e)
            })?;

        let user = User::new(caller.user_id(), caller.email(), customer_id);
        if let Err(e) = self.repo.create_user(&user).await {
            tracing::warn!(
                error = %e,
                record = ?user,
                "Failed to store customer after successful processor call"
            );
            return Err(BillingError::Unreconciled("creating customer"));
        }

        tracing::info!(customer_id = %user.remote_id, "Created customer");
        Ok(user.remote_id)
    }
}
