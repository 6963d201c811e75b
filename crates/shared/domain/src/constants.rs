//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Username
// =============================================================================

/// Minimum username length
pub const MIN_USERNAME_LENGTH: u64 = 3;

/// Maximum username length
pub const MAX_USERNAME_LENGTH: u64 = 50;

/// Allowed username characters (letters, digits, underscore)
pub const USERNAME_PATTERN: &str = r"^[a-zA-Z0-9_]+$";

// =============================================================================
// Profile
// =============================================================================

/// Maximum email length
pub const MAX_EMAIL_LENGTH: u64 = 100;

/// Maximum bio length
pub const MAX_BIO_LENGTH: u64 = 500;

// =============================================================================
// Password
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum accepted raw password length at the input boundary
pub const MAX_PASSWORD_LENGTH: u64 = 100;

/// Message carried by the strength gate failure
pub const WEAK_PASSWORD_MESSAGE: &str =
    "Password must be at least 8 characters and contain upper and lower case letters, a digit and a special character";

// =============================================================================
// Hashing
// =============================================================================

/// Default bcrypt work factor
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Smallest work factor bcrypt accepts
pub const MIN_BCRYPT_COST: u32 = 4;

/// Largest work factor bcrypt accepts
pub const MAX_BCRYPT_COST: u32 = 31;

/// bcrypt only reads this many bytes of input
pub const MAX_BCRYPT_PASSWORD_BYTES: usize = 72;

/// Hash prefixes produced by bcrypt implementations
pub const BCRYPT_PREFIXES: &[&str] = &["$2a$", "$2b$", "$2x$", "$2y$"];

/// Hash prefix produced by argon2 (PHC string format)
pub const ARGON2_PREFIX: &str = "$argon2";
