//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - `Authorization` header parsing (bearer credentials)
//! - A minimal Stripe REST client used by the real payment proxy

pub mod client;
pub mod stripe;
