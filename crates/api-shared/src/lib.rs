//! # API Shared
//!
//! Shared utilities and definitions for the StoreIt APIs.
//!
//! Contains:
//! - Request and response types with OpenAPI schemas (`dto` module)
//! - Shared services like `HealthService`
//! - Session extraction from `Authorization` headers
//!
//! Used by `api-rest` and the CLI for common functionality.

pub mod auth;
pub mod dto;
pub mod health;

pub use auth::{session_from_authorization, AuthError};
pub use dto::*;
pub use health::HealthService;
