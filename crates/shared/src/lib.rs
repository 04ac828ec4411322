//! Shared types, errors, and configuration for Botica.
//!
//! This crate provides common types used across all other crates:
//! - Money types with decimal precision
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - JWT claims validation for tokens issued by the identity provider
//! - Configuration management

pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{Claims, JwtError, JwtValidator};
pub use types::{Currency, Money, PageRequest, PageResponse};
