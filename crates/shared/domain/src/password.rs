//! Credential service - password strength, hashing and verification.
//!
//! Stateless: every method takes `&self` over immutable options, so one
//! instance can be shared across threads without synchronization.

use std::fmt;
use std::str::FromStr;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use crate::constants::{
    ARGON2_PREFIX, BCRYPT_PREFIXES, DEFAULT_BCRYPT_COST, MAX_BCRYPT_COST,
    MAX_BCRYPT_PASSWORD_BYTES, MIN_BCRYPT_COST, MIN_PASSWORD_LENGTH,
};
use crate::error::{DomainError, DomainResult};

/// Adaptive hash algorithms supported for new hashes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Bcrypt,
    Argon2,
}

impl HashAlgorithm {
    /// Detect the algorithm that produced an encoded hash from its prefix.
    pub fn detect(hash: &str) -> Option<Self> {
        if BCRYPT_PREFIXES.iter().any(|prefix| hash.starts_with(prefix)) {
            Some(HashAlgorithm::Bcrypt)
        } else if hash.starts_with(ARGON2_PREFIX) {
            Some(HashAlgorithm::Argon2)
        } else {
            None
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Bcrypt => write!(f, "bcrypt"),
            HashAlgorithm::Argon2 => write!(f, "argon2"),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bcrypt" => Ok(HashAlgorithm::Bcrypt),
            "argon2" => Ok(HashAlgorithm::Argon2),
            other => Err(DomainError::invalid_argument(format!(
                "Unknown hash algorithm: {}",
                other
            ))),
        }
    }
}

/// Hashing parameters for newly encoded passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingOptions {
    pub algorithm: HashAlgorithm,
    /// bcrypt work factor (ignored for argon2)
    pub bcrypt_cost: u32,
}

impl Default for HashingOptions {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Bcrypt,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }
}

/// One-way password encoding seam.
///
/// Implemented by [`CredentialService`]; mocked in service tests.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait PasswordEncoder: Send + Sync {
    /// Produce a salted hash of `raw`. Output differs on every call.
    fn encode(&self, raw: &str) -> DomainResult<String>;

    /// Check `raw` against an encoded hash.
    fn matches(&self, raw: &str, hashed: &str) -> bool;
}

/// Password strength predicate.
///
/// A password is strong when it has at least 8 characters and contains a
/// lowercase letter, an uppercase letter, an ASCII digit, and a character
/// outside `[A-Za-z0-9]`. All four classes are required.
///
/// Case is detected by case mapping: a password has an uppercase letter if
/// lowercasing changes it, and a lowercase letter if uppercasing does. A
/// titlecase letter such as `ǅ` therefore counts as both.
pub fn is_password_strong<'a>(password: impl Into<Option<&'a str>>) -> bool {
    let Some(password) = password.into() else {
        return false;
    };

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return false;
    }

    let has_upper = password != password.to_lowercase();
    let has_lower = password != password.to_uppercase();
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_ascii_alphanumeric());

    has_upper && has_lower && has_digit && has_special
}

/// Stateless helper for password strength, hashing and verification.
#[derive(Debug, Clone, Default)]
pub struct CredentialService {
    options: HashingOptions,
}

impl CredentialService {
    /// Create a service with the given hashing options.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the bcrypt cost is outside 4..=31.
    pub fn new(options: HashingOptions) -> DomainResult<Self> {
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&options.bcrypt_cost) {
            return Err(DomainError::invalid_argument(format!(
                "bcrypt cost must be between {} and {}, got {}",
                MIN_BCRYPT_COST, MAX_BCRYPT_COST, options.bcrypt_cost
            )));
        }
        Ok(Self { options })
    }

    /// See [`is_password_strong`].
    pub fn is_password_strong<'a>(&self, password: impl Into<Option<&'a str>>) -> bool {
        is_password_strong(password)
    }

    /// Hash a password with the configured algorithm.
    ///
    /// # Errors
    /// `InvalidArgument` if bcrypt is selected and `raw` is longer than 72
    /// bytes; bcrypt would otherwise ignore the tail.
    pub fn encode_password(&self, raw: &str) -> DomainResult<String> {
        debug!(algorithm = %self.options.algorithm, "Encoding password");
        match self.options.algorithm {
            HashAlgorithm::Bcrypt => {
                if raw.len() > MAX_BCRYPT_PASSWORD_BYTES {
                    return Err(DomainError::invalid_argument(format!(
                        "Password must not exceed {} bytes",
                        MAX_BCRYPT_PASSWORD_BYTES
                    )));
                }
                bcrypt::hash(raw, self.options.bcrypt_cost)
                    .map_err(|e| DomainError::hashing(format!("bcrypt hash failed: {}", e)))
            }
            HashAlgorithm::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                Argon2::default()
                    .hash_password(raw.as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|e| DomainError::hashing(format!("argon2 hash failed: {}", e)))
            }
        }
    }

    /// Verify a password against an encoded hash.
    ///
    /// The algorithm is taken from the hash itself, so hashes produced under
    /// earlier options still verify. Malformed hashes never match, and
    /// neither does a password longer than bcrypt can read.
    pub fn matches(&self, raw: &str, hashed: &str) -> bool {
        if hashed.is_empty() {
            warn!("Empty encoded password");
            return false;
        }

        let result = match HashAlgorithm::detect(hashed) {
            Some(HashAlgorithm::Bcrypt) if raw.len() > MAX_BCRYPT_PASSWORD_BYTES => return false,
            Some(HashAlgorithm::Bcrypt) => bcrypt::verify(raw, hashed).map_err(|e| e.to_string()),
            Some(HashAlgorithm::Argon2) => PasswordHash::new(hashed)
                .map(|parsed| {
                    Argon2::default()
                        .verify_password(raw.as_bytes(), &parsed)
                        .is_ok()
                })
                .map_err(|e| e.to_string()),
            None => {
                warn!("Encoded password does not look like a supported hash");
                return false;
            }
        };

        result.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to verify encoded password");
            false
        })
    }

    /// Whether a stored hash was produced with different options than the
    /// current ones.
    pub fn needs_rehash(&self, hashed: &str) -> bool {
        match HashAlgorithm::detect(hashed) {
            Some(algorithm) if algorithm != self.options.algorithm => true,
            Some(HashAlgorithm::Bcrypt) => bcrypt_cost(hashed) != Some(self.options.bcrypt_cost),
            Some(HashAlgorithm::Argon2) => false,
            None => true,
        }
    }
}

impl PasswordEncoder for CredentialService {
    fn encode(&self, raw: &str) -> DomainResult<String> {
        self.encode_password(raw)
    }

    fn matches(&self, raw: &str, hashed: &str) -> bool {
        CredentialService::matches(self, raw, hashed)
    }
}

/// Work factor embedded in a bcrypt hash (`$2b$<cost>$...`).
fn bcrypt_cost(hashed: &str) -> Option<u32> {
    hashed.split('$').nth(2)?.parse().ok()
}
