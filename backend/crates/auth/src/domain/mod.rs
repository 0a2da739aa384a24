//! Domain Layer
//!
//! - Claims decoded from a verified bearer token
//! - The caller identity derived from them (user id + admin flag)

pub mod claims;
pub mod identity;
