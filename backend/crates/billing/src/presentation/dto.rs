//! API DTOs (Data Transfer Objects)

use crate::domain::entities::Subscription;
use chrono::{DateTime, Utc};
use kernel::id::SubscriptionId;
use serde::{Deserialize, Serialize};

/// Body of PUT /subscriptions/{type}
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    #[serde(default)]
    pub plan: String,
    /// Client-side processor token
    #[serde(default)]
    pub stripe_key: String,
}

/// Query of GET /subscriptions/{type}
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewQuery {
    /// Owner to look up (admins only when not the caller)
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Subscription as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    pub id: SubscriptionId,
    #[serde(rename = "type")]
    pub kind: String,
    pub user_id: String,
    pub remote_id: String,
    pub plan: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(s: Subscription) -> Self {
        Self {
            id: s.id,
            kind: s.kind,
            user_id: s.user_id,
            remote_id: s.remote_id,
            plan: s.plan,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Response for GET /
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloResponse {
    pub version: String,
    pub application: String,
}
