//! Caller Identity

use crate::domain::claims::Claims;

/// Authenticated caller of a request
#[derive(Debug, Clone)]
pub struct Identity {
    pub claims: Claims,
    /// True iff one of the caller's groups is the configured admin group
    pub is_admin: bool,
}

impl Identity {
    pub fn new(claims: Claims, admin_group_name: &str) -> Self {
        let is_admin = !admin_group_name.is_empty() && claims.in_group(admin_group_name);
        Self { claims, is_admin }
    }

    pub fn user_id(&self) -> &str {
        &self.claims.id
    }

    pub fn email(&self) -> &str {
        &self.claims.email
    }
}
