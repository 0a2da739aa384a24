//! Domain Entities
//!
//! Core business entities for the billing domain.

use chrono::{DateTime, SubsecRound, Utc};
use kernel::id::SubscriptionId;

use crate::error::{BillingError, BillingResult};

/// Current time at the precision the store keeps (microseconds)
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Subscription entity - one paid plan of one user, keyed by `(user_id, kind)`
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: SubscriptionId,
    /// Caller-supplied category key (`type` on the wire)
    pub kind: String,
    pub user_id: String,
    /// Processor-side subscription id
    pub remote_id: String,
    pub plan: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Create a new, validated subscription
    pub fn new(
        user_id: impl Into<String>,
        kind: impl Into<String>,
        plan: impl Into<String>,
        remote_id: impl Into<String>,
    ) -> BillingResult<Self> {
        let now = now();
        let subscription = Self {
            id: SubscriptionId::new(),
            kind: kind.into(),
            user_id: user_id.into(),
            remote_id: remote_id.into(),
            plan: plan.into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        subscription.validate()?;
        Ok(subscription)
    }

    /// Persistence gate: none of the key fields may be empty
    pub fn validate(&self) -> BillingResult<()> {
        let missing: Vec<&'static str> = [
            ("user_id", &self.user_id),
            ("plan", &self.plan),
            ("remote_id", &self.remote_id),
            ("type", &self.kind),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(BillingError::InvalidRecord(missing))
        }
    }

    /// Move to a new plan / processor id
    pub fn apply_change(&mut self, plan: impl Into<String>, remote_id: impl Into<String>) {
        self.plan = plan.into();
        self.remote_id = remote_id.into();
        self.updated_at = now();
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// User entity - links an identity to its processor-side customer
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Identity id from the token claims
    pub id: String,
    pub email: String,
    /// Processor-side customer id
    pub remote_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        remote_id: impl Into<String>,
    ) -> Self {
        let now = now();
        Self {
            id: id.into(),
            email: email.into(),
            remote_id: remote_id.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
