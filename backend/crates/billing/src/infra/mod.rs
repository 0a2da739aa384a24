//! Infrastructure Layer
//!
//! Store and payment processor implementations.

pub mod memory;
pub mod payer;
pub mod postgres;
