//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Subscription, User)
//! - Repository traits (interfaces)
//! - The payment proxy port

pub mod entities;
pub mod payer;
pub mod repository;
