//! Application Layer
//!
//! Token verification and request authentication.

pub mod authenticate;
pub mod config;
pub mod verify_token;

// Re-exports
pub use authenticate::AuthenticateUseCase;
pub use config::AuthConfig;
pub use verify_token::TokenVerifier;
