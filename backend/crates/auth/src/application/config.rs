//! Application Configuration
//!
//! Configuration for the Auth application layer.

/// Auth application configuration
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// Shared HS256 secret used by the identity system to sign tokens
    pub jwt_secret: String,
    /// Group whose members are treated as administrators
    pub admin_group_name: String,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, admin_group_name: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            admin_group_name: admin_group_name.into(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("admin_group_name", &self.admin_group_name)
            .finish()
    }
}
