//! Common utilities shared across services.
//!
//! This crate provides:
//! - Application error type with domain error conversion
//! - Environment-driven configuration

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult};
