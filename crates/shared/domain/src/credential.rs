//! Stored password credential.

/// Password value held by a user record.
///
/// A credential is either pending encoding (`Raw`) or already encoded
/// (`Hashed`). The variant is the phase tag: callers never have to guess
/// whether the string needs hashing.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Plain text awaiting encoding
    Raw(String),
    /// Opaque output of the configured hash algorithm
    Hashed(String),
}

// Never expose the value in debug output
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Raw(_) => f.write_str("Raw([REDACTED])"),
            Credential::Hashed(_) => f.write_str("Hashed([REDACTED])"),
        }
    }
}

impl Credential {
    /// Wrap a plain text password.
    pub fn raw(value: impl Into<String>) -> Self {
        Credential::Raw(value.into())
    }

    /// Wrap an existing hash (e.g. loaded from storage).
    pub fn hashed(value: impl Into<String>) -> Self {
        Credential::Hashed(value.into())
    }

    pub fn is_hashed(&self) -> bool {
        matches!(self, Credential::Hashed(_))
    }

    /// The stored hash, if this credential has been encoded.
    pub fn hash(&self) -> Option<&str> {
        match self {
            Credential::Hashed(hash) => Some(hash),
            Credential::Raw(_) => None,
        }
    }
}
