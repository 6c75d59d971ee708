//! # Podium Core
//!
//! Core types, errors, and utilities for the Podium API.
//!
//! This crate provides foundational types used throughout the Podium application:
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`response`]: The `{ success, data }` JSON envelope for successful responses
//! - [`pagination`]: Page-based list parameters and response metadata
//! - [`password`]: Password hashing and verification
//!
//! # Example
//!
//! ```ignore
//! use podium_core::{AppError, ApiResponse};
//!
//! async fn handler() -> Result<ApiResponse<String>, AppError> {
//!     Err(AppError::not_found(anyhow::anyhow!("Event not found")))
//! }
//! ```

pub mod errors;
pub mod pagination;
pub mod password;
pub mod response;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, hash_password_with_cost, verify_password};
pub use response::ApiResponse;
