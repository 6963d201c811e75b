//! Domain layer - User records and credential handling.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! the user entity, its field constraints, and the password strength,
//! hashing and verification rules.

pub mod constants;
pub mod credential;
pub mod error;
pub mod password;
pub mod user;
pub mod validation;

pub use constants::*;
pub use credential::Credential;
pub use error::{DomainError, DomainResult};
pub use password::{is_password_strong, CredentialService, HashAlgorithm, HashingOptions, PasswordEncoder};
pub use user::{NewUser, StoredUser, UserRecord, UserResponse};
pub use validation::FieldViolation;

#[cfg(any(test, feature = "test-utils"))]
pub use password::MockPasswordEncoder;
