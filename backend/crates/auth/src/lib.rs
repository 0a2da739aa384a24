//! Auth (Authentication) Backend Module
//!
//! Consumes bearer tokens issued by an external identity system; it never
//! issues them.
//!
//! Clean Architecture structure:
//! - `domain/` - Identity claims and the derived caller identity
//! - `application/` - Token verification and caller authentication
//!
//! ## Security Model
//! - Tokens are HS256-signed with a shared secret; any other algorithm is rejected
//! - Expiry is checked without leeway (`exp <= now` is expired)
//! - Admin privileges come from membership in one configured group

pub mod application;
pub mod domain;
pub mod error;

// Re-exports for convenience
pub use application::authenticate::AuthenticateUseCase;
pub use application::config::AuthConfig;
pub use application::verify_token::TokenVerifier;
pub use domain::claims::Claims;
pub use domain::identity::Identity;
pub use error::{AuthError, AuthResult};

// Re-export kernel error types for unified error handling
pub use kernel::error::{app_error::AppError, kind::ErrorKind};
