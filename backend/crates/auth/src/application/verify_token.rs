//! Verify Token
//!
//! Turns an `Authorization` header into verified claims.

use axum::http::HeaderMap;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use platform::client::extract_bearer_token;

use crate::domain::claims::Claims;
use crate::error::{AuthError, AuthResult};

/// The only signing algorithm accepted
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Bearer token verifier bound to one shared secret
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        // Expiry is checked by hand: no leeway, and the error names the instant.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify the bearer credential in `headers`, if any
    ///
    /// ## Returns
    /// * `Ok(None)` - No `Authorization` header (anonymous request)
    /// * `Ok(Some(claims))` - Valid, unexpired, correctly signed token
    /// * `Err(AuthError::BadHeader)` - Header not of the form `Bearer <token>`
    /// * `Err(AuthError::InvalidToken | AuthError::TokenExpired)` - Token rejected
    pub fn verify(&self, headers: &HeaderMap) -> AuthResult<Option<Claims>> {
        let Some(token) = extract_bearer_token(headers)? else {
            return Ok(None);
        };
        self.decode(token).map(Some)
    }

    /// Decode and check a raw token string
    pub fn decode(&self, token: &str) -> AuthResult<Claims> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Token rejected");
            AuthError::InvalidToken
        })?;

        let claims = data.claims;
        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenExpired(claims.exp));
        }

        Ok(claims)
    }
}
