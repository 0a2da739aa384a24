//! Presentation Layer
//!
//! HTTP handlers, request context and DTOs for the API.

pub mod context;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;
