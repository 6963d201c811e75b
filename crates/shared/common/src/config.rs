//! Shared configuration structures.

use std::env;

use serde::{Deserialize, Serialize};
use tracing::warn;

use domain::{HashAlgorithm, HashingOptions, DEFAULT_BCRYPT_COST};

/// Environment variable selecting the hash algorithm for new hashes
pub const ENV_HASH_ALGORITHM: &str = "PASSWORD_HASH_ALGORITHM";

/// Environment variable holding the bcrypt work factor
pub const ENV_BCRYPT_COST: &str = "BCRYPT_COST";

/// Password hashing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CredentialConfig {
    /// Algorithm used for newly encoded passwords
    pub algorithm: HashAlgorithm,
    /// bcrypt work factor (4..=31)
    pub bcrypt_cost: u32,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Bcrypt,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }
}

impl CredentialConfig {
    /// Load configuration from environment variables (and `.env`, if present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unparseable values fall back to defaults with a warning; range
    /// checks happen when the credential service is built.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let algorithm = match lookup(ENV_HASH_ALGORITHM) {
            Some(value) => value.parse().unwrap_or_else(|_| {
                warn!(value = %value, "Unknown {}, using {}", ENV_HASH_ALGORITHM, defaults.algorithm);
                defaults.algorithm
            }),
            None => defaults.algorithm,
        };

        let bcrypt_cost = match lookup(ENV_BCRYPT_COST) {
            Some(value) => value.trim().parse().unwrap_or_else(|_| {
                warn!(value = %value, "Invalid {}, using {}", ENV_BCRYPT_COST, defaults.bcrypt_cost);
                defaults.bcrypt_cost
            }),
            None => defaults.bcrypt_cost,
        };

        Self {
            algorithm,
            bcrypt_cost,
        }
    }

    pub fn hashing_options(&self) -> HashingOptions {
        HashingOptions {
            algorithm: self.algorithm,
            bcrypt_cost: self.bcrypt_cost,
        }
    }
}
