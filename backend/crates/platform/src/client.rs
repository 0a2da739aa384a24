//! Client credential utilities
//!
//! Common functions for reading client credentials from HTTP headers.

use axum::http::{HeaderMap, header};

/// Error when the `Authorization` header is present but unusable
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BearerError {
    #[error("Bad authentication header")]
    Malformed,
}

/// Extract a bearer token from the `Authorization` header
///
/// The header must read `Bearer <token>` where the scheme is matched
/// case-insensitively and the token is a single run of non-whitespace.
///
/// ## Arguments
/// * `headers` - HTTP request headers
///
/// ## Returns
/// * `Ok(None)` - No (or an empty) `Authorization` header
/// * `Ok(Some(token))` - A well-formed bearer credential
/// * `Err(BearerError::Malformed)` - Anything else
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<Option<&str>, BearerError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| BearerError::Malformed)?;
    if value.is_empty() {
        return Ok(None);
    }

    let (scheme, token) = value.split_once(' ').ok_or(BearerError::Malformed)?;
    if !scheme.eq_ignore_ascii_case("bearer")
        || token.is_empty()
        || token.chars().any(char::is_whitespace)
    {
        return Err(BearerError::Malformed);
    }

    Ok(Some(token))
}
