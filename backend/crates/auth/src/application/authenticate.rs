//! Authenticate Use Case
//!
//! Requires a valid token on the request and derives the caller identity.

use axum::http::HeaderMap;

use crate::application::config::AuthConfig;
use crate::application::verify_token::TokenVerifier;
use crate::domain::identity::Identity;
use crate::error::{AuthError, AuthResult};

/// Authenticate Use Case
#[derive(Clone)]
pub struct AuthenticateUseCase {
    verifier: TokenVerifier,
    admin_group_name: String,
}

impl AuthenticateUseCase {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            verifier: TokenVerifier::new(&config.jwt_secret),
            admin_group_name: config.admin_group_name.clone(),
        }
    }

    /// Authenticate a request; anonymous requests are rejected
    pub fn execute(&self, headers: &HeaderMap) -> AuthResult<Identity> {
        let claims = self.verifier.verify(headers)?.ok_or(AuthError::MissingToken)?;
        Ok(Identity::new(claims, &self.admin_group_name))
    }
}
