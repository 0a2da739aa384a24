//! In-Memory Repository Implementation
//!
//! Same semantics as the PostgreSQL store (soft delete, unscoped lookup,
//! one active subscription per `(user_id, type)`) without a database.

use crate::domain::entities::{Subscription, User};
use crate::domain::repository::{SubscriptionRepository, UserRepository};
use crate::error::{BillingError, BillingResult};
use chrono::Utc;
use kernel::id::SubscriptionId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct MemoryState {
    subscriptions: Vec<Subscription>,
    users: HashMap<String, User>,
}

/// Process-local repository
#[derive(Clone, Default)]
pub struct MemoryBillingRepository {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryBillingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubscriptionRepository for MemoryBillingRepository {
    async fn find_by_user(&self, user_id: &str) -> BillingResult<Vec<Subscription>> {
        let state = self.state.read().await;
        Ok(state
            .subscriptions
            .iter()
            .filter(|s| !s.is_deleted() && s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_user_and_type(
        &self,
        user_id: &str,
        kind: &str,
    ) -> BillingResult<Option<Subscription>> {
        let state = self.state.read().await;
        Ok(state
            .subscriptions
            .iter()
            .find(|s| !s.is_deleted() && s.user_id == user_id && s.kind == kind)
            .cloned())
    }

    async fn find_unscoped(&self, id: SubscriptionId) -> BillingResult<Option<Subscription>> {
        let state = self.state.read().await;
        Ok(state.subscriptions.iter().find(|s| s.id == id).cloned())
    }

    async fn create_subscription(&self, subscription: &Subscription) -> BillingResult<()> {
        subscription.validate()?;

        let mut state = self.state.write().await;
        let taken = state.subscriptions.iter().any(|s| {
            s.id == subscription.id
                || (!s.is_deleted()
                    && s.user_id == subscription.user_id
                    && s.kind == subscription.kind)
        });
        if taken {
            return Err(BillingError::Store(format!(
                "active subscription of type {} already exists for user {}",
                subscription.kind, subscription.user_id
            )));
        }

        state.subscriptions.push(subscription.clone());
        Ok(())
    }

    async fn update_subscription(&self, subscription: &Subscription) -> BillingResult<()> {
        subscription.validate()?;

        let mut state = self.state.write().await;
        let row = state
            .subscriptions
            .iter_mut()
            .find(|s| s.id == subscription.id && !s.is_deleted())
            .ok_or(BillingError::NotFound)?;

        row.plan = subscription.plan.clone();
        row.remote_id = subscription.remote_id.clone();
        row.updated_at = subscription.updated_at;
        Ok(())
    }

    async fn soft_delete_subscription(&self, id: SubscriptionId) -> BillingResult<()> {
        let mut state = self.state.write().await;
        if let Some(row) = state
            .subscriptions
            .iter_mut()
            .find(|s| s.id == id && !s.is_deleted())
        {
            row.deleted_at = Some(Utc::now());
        }
        Ok(())
    }
}

impl UserRepository for MemoryBillingRepository {
    async fn find_user(&self, id: &str) -> BillingResult<Option<User>> {
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn create_user(&self, user: &User) -> BillingResult<()> {
        let mut state = self.state.write().await;
        if state.users.contains_key(&user.id) {
            return Err(BillingError::Store(format!("user {} already exists", user.id)));
        }
        state.users.insert(user.id.clone(), user.clone());
        Ok(())
    }
}
