//! Application Configuration
//!
//! Configuration for the billing application layer.

use auth::AuthConfig;

/// Name reported by the version endpoint
pub const APPLICATION_NAME: &str = "netlify-subscriptions";

/// Billing application configuration
#[derive(Debug, Clone, Default)]
pub struct BillingConfig {
    /// Token verification and admin group
    pub auth: AuthConfig,
}

impl BillingConfig {
    pub fn new(jwt_secret: impl Into<String>, admin_group_name: impl Into<String>) -> Self {
        Self {
            auth: AuthConfig::new(jwt_secret, admin_group_name),
        }
    }
}
