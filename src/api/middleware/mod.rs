//! HTTP middleware for request processing.
//!
//! Provides authentication and observability middleware.

pub mod auth;
pub mod tracing;
