//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of the service vocabulary:
//! - The error taxonomy every handler collapses into (`{code, msg}` bodies)
//! - Typed ID wrappers for persisted entities
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
