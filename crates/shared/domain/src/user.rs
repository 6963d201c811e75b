//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use validator::Validate;

use crate::constants::WEAK_PASSWORD_MESSAGE;
use crate::credential::Credential;
use crate::error::{DomainError, DomainResult};
use crate::password::{is_password_strong, PasswordEncoder};
use crate::validation::{self, FieldViolation, USERNAME_REGEX};

/// User domain entity
///
/// Structural constraints (username, email, bio) are declared here but only
/// checked when a caller runs [`UserRecord::validate_fields`]; construction
/// never rejects input.
#[derive(Debug, Clone, Validate)]
pub struct UserRecord {
    /// Assigned by storage; `None` before first persistence
    pub id: Option<i64>,
    #[validate(
        length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"),
        regex(
            path = *USERNAME_REGEX,
            message = "Username may only contain letters, digits and underscores"
        )
    )]
    pub username: String,
    #[validate(
        email(message = "Invalid email format"),
        length(max = 100, message = "Email must not exceed 100 characters")
    )]
    pub email: String,
    password: Credential,
    pub is_active: bool,
    #[validate(length(max = 500, message = "Bio must not exceed 500 characters"))]
    bio: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Create a new active user. Both timestamps are set to now.
    pub fn new(username: impl Into<String>, email: impl Into<String>, password: Credential) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            username: username.into(),
            email: email.into(),
            password,
            is_active: true,
            bio: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn password(&self) -> &Credential {
        &self.password
    }

    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replace the credential as-is (no strength check, no hashing).
    ///
    /// Use `Credential::Hashed` for values that are already encoded.
    pub fn set_password(&mut self, password: Credential) {
        self.password = password;
        self.touch();
    }

    /// Check strength, hash and store a raw password.
    ///
    /// # Errors
    /// `InvalidArgument` if the password is weak; the record is unchanged.
    /// `Hashing` if the encoder fails.
    pub fn set_password_encoded(
        &mut self,
        raw: &str,
        encoder: &dyn PasswordEncoder,
    ) -> DomainResult<()> {
        if !is_password_strong(raw) {
            return Err(DomainError::invalid_argument(WEAK_PASSWORD_MESSAGE));
        }

        let hash = encoder.encode(raw)?;
        self.set_password(Credential::Hashed(hash));
        Ok(())
    }

    /// Encode a pending raw credential.
    ///
    /// Returns `false` without touching the record when the credential is
    /// already hashed.
    pub fn encode_pending(&mut self, encoder: &dyn PasswordEncoder) -> DomainResult<bool> {
        let raw = match &self.password {
            Credential::Raw(raw) => raw.clone(),
            Credential::Hashed(_) => return Ok(false),
        };
        self.set_password_encoded(&raw, encoder)?;
        Ok(true)
    }

    /// Check a login attempt against the stored hash.
    pub fn verify_password(&self, raw: &str, encoder: &dyn PasswordEncoder) -> bool {
        match &self.password {
            Credential::Hashed(hash) => encoder.matches(raw, hash),
            Credential::Raw(_) => {
                warn!(username = %self.username, "Verifying against an unencoded credential");
                false
            }
        }
    }

    pub fn set_bio(&mut self, bio: Option<String>) {
        self.bio = bio;
        self.touch();
    }

    /// Check username, email and bio constraints.
    pub fn validate_fields(&self) -> Vec<FieldViolation> {
        validation::check(self)
    }

    /// Convert to a storage row. Only hashed credentials may be persisted.
    pub fn to_stored(&self) -> DomainResult<StoredUser> {
        let password_hash = self
            .password
            .hash()
            .ok_or_else(|| DomainError::invalid_argument("Password must be encoded before storage"))?
            .to_string();

        Ok(StoredUser {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            password_hash,
            is_active: self.is_active,
            bio: self.bio.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }

    // Clamped so updated_at never moves backwards, even if the clock does.
    fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }
}

/// Storage row shape, mirroring the users table columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: Option<i64>,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StoredUser> for UserRecord {
    fn from(row: StoredUser) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            password: Credential::Hashed(row.password_hash),
            is_active: row.is_active,
            bio: row.bio,
            created_at: row.created_at,
            updated_at: row.updated_at.max(row.created_at),
        }
    }
}

/// User registration input
#[derive(Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(
        length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"),
        regex(
            path = *USERNAME_REGEX,
            message = "Username may only contain letters, digits and underscores"
        )
    )]
    pub username: String,
    #[validate(
        email(message = "Invalid email format"),
        length(max = 100, message = "Email must not exceed 100 characters")
    )]
    pub email: String,
    /// Checked again at hashing time: bcrypt rejects more than 72 bytes
    #[validate(length(
        min = 8,
        max = 100,
        message = "Password must be between 8 and 100 characters"
    ))]
    pub password: String,
    #[validate(length(max = 500, message = "Bio must not exceed 500 characters"))]
    pub bio: Option<String>,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("bio", &self.bio)
            .finish()
    }
}

impl NewUser {
    /// Validate all fields.
    pub fn validate_fields(&self) -> Vec<FieldViolation> {
        validation::check(self)
    }

    /// Validate, check strength, hash, and build the record.
    ///
    /// The returned record always holds a hashed credential, and its two
    /// timestamps are equal.
    pub fn into_record(self, encoder: &dyn PasswordEncoder) -> DomainResult<UserRecord> {
        validation::ensure_valid(&self)?;
        if !is_password_strong(self.password.as_str()) {
            return Err(DomainError::invalid_argument(WEAK_PASSWORD_MESSAGE));
        }

        let hash = encoder.encode(&self.password)?;
        let mut record = UserRecord::new(self.username, self.email, Credential::Hashed(hash));
        record.bio = self.bio;
        Ok(record)
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Option<i64>,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&UserRecord> for UserResponse {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            is_active: user.is_active,
            bio: user.bio.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MIN_BCRYPT_COST;
    use crate::password::{CredentialService, HashAlgorithm, HashingOptions, MockPasswordEncoder};

    fn fast_service() -> CredentialService {
        CredentialService::new(HashingOptions {
            algorithm: HashAlgorithm::Bcrypt,
            bcrypt_cost: MIN_BCRYPT_COST,
        })
        .unwrap()
    }

    fn create_test_user() -> UserRecord {
        UserRecord::new("test_user", "test@example.com", Credential::raw("Initial1!"))
    }

    fn new_user(username: &str, password: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: "new@example.com".to_string(),
            password: password.to_string(),
            bio: None,
        }
    }

    #[test]
    fn test_new_user_defaults() {
        let user = create_test_user();

        assert_eq!(user.id, None);
        assert!(user.is_active);
        assert_eq!(user.bio(), None);
        assert_eq!(user.created_at(), user.updated_at());
        assert!(!user.password().is_hashed());
    }

    #[test]
    fn test_set_password_encoded_weak_leaves_record_unchanged() {
        let mut user = create_test_user();
        let before_password = user.password().clone();
        let before_updated = user.updated_at();

        let result = user.set_password_encoded("weakpass", &fast_service());

        assert!(matches!(result, Err(DomainError::InvalidArgument(_))));
        assert_eq!(user.password(), &before_password);
        assert_eq!(user.updated_at(), before_updated);
    }

    #[test]
    fn test_set_password_encoded_strong() {
        let service = fast_service();
        let mut user = create_test_user();
        let before_updated = user.updated_at();

        user.set_password_encoded("Strong1!", &service).unwrap();

        let hash = user.password().hash().unwrap();
        assert_ne!(hash, "Strong1!");
        assert!(user.updated_at() >= before_updated);
        assert!(user.updated_at() >= user.created_at());
        assert!(user.verify_password("Strong1!", &service));
        assert!(!user.verify_password("Strong2!", &service));
    }

    #[test]
    fn test_weak_password_never_reaches_encoder() {
        let mut encoder = MockPasswordEncoder::new();
        encoder.expect_encode().never();

        let mut user = create_test_user();
        assert!(user.set_password_encoded("abc", &encoder).is_err());
    }

    #[test]
    fn test_encoder_failure_propagates() {
        let mut encoder = MockPasswordEncoder::new();
        encoder
            .expect_encode()
            .returning(|_| Err(DomainError::hashing("boom")));

        let mut user = create_test_user();
        let before = user.password().clone();
        let result = user.set_password_encoded("Strong1!", &encoder);

        assert!(matches!(result, Err(DomainError::Hashing(_))));
        assert_eq!(user.password(), &before);
    }

    #[test]
    fn test_encode_pending_hashes_once() {
        let mut encoder = MockPasswordEncoder::new();
        encoder
            .expect_encode()
            .times(1)
            .returning(|raw| Ok(format!("$2b$04$hash-of-{}", raw.len())));

        let mut user = create_test_user();
        assert!(user.encode_pending(&encoder).unwrap());
        assert!(user.password().is_hashed());

        // Second call must not re-hash the stored hash
        assert!(!user.encode_pending(&encoder).unwrap());
    }

    #[test]
    fn test_set_password_stores_as_is() {
        let mut user = create_test_user();
        let before_updated = user.updated_at();

        user.set_password(Credential::hashed("$2b$04$stored"));

        assert_eq!(user.password().hash(), Some("$2b$04$stored"));
        assert!(user.updated_at() >= before_updated);
    }

    #[test]
    fn test_verify_against_raw_credential_fails() {
        let mut encoder = MockPasswordEncoder::new();
        encoder.expect_matches().never();

        let user = create_test_user();
        assert!(!user.verify_password("Initial1!", &encoder));
    }

    #[test]
    fn test_set_bio_touches() {
        let mut user = create_test_user();
        let before = user.updated_at();

        user.set_bio(Some("Hello".to_string()));

        assert_eq!(user.bio(), Some("Hello"));
        assert!(user.updated_at() >= before);
    }

    #[test]
    fn test_validate_fields() {
        let user = create_test_user();
        assert!(user.validate_fields().is_empty());

        let mut user = UserRecord::new("ab", "not-an-email", Credential::raw("x"));
        user.set_bio(Some("x".repeat(501)));
        let fields: Vec<String> = user
            .validate_fields()
            .into_iter()
            .map(|v| v.field)
            .collect();

        assert_eq!(fields, vec!["bio", "email", "username"]);
    }

    #[test]
    fn test_username_charset_and_length() {
        let bad_chars = UserRecord::new("bad name!", "a@b.com", Credential::raw("x"));
        assert_eq!(bad_chars.validate_fields().len(), 1);

        let too_long = UserRecord::new("a".repeat(51), "a@b.com", Credential::raw("x"));
        assert_eq!(too_long.validate_fields()[0].field, "username");

        let boundary = UserRecord::new("a".repeat(50), "a@b.com", Credential::raw("x"));
        assert!(boundary.validate_fields().is_empty());
    }

    #[test]
    fn test_email_length_limit() {
        let email = format!("{}@{}.com", "a".repeat(40), "b".repeat(60));
        let user = UserRecord::new("valid_name", email, Credential::raw("x"));

        let violations = user.validate_fields();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].message, "Email must not exceed 100 characters");
    }

    #[test]
    fn test_into_record_hashes_password() {
        let service = fast_service();
        let record = new_user("new_user", "Strong1!").into_record(&service).unwrap();

        assert!(record.password().is_hashed());
        assert_eq!(record.created_at(), record.updated_at());
        assert!(record.verify_password("Strong1!", &service));
    }

    #[test]
    fn test_into_record_rejects_invalid_fields() {
        let result = new_user("ab", "Strong1!").into_record(&fast_service());
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_into_record_rejects_weak_password() {
        let result = new_user("new_user", "longbutweak").into_record(&fast_service());
        assert!(matches!(result, Err(DomainError::InvalidArgument(_))));
    }

    #[test]
    fn test_new_user_password_length_bounds() {
        let at_limit = new_user("new_user", &format!("Aa1!{}", "x".repeat(96)));
        assert!(at_limit.validate_fields().is_empty());

        let over_limit = new_user("new_user", &format!("Aa1!{}", "x".repeat(97)));
        let violations = over_limit.validate_fields();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "password");
    }

    #[test]
    fn test_passwords_beyond_bcrypt_limit_rejected() {
        let service = fast_service();
        let prefix = format!("Aa1!{}", "x".repeat(70));
        let first = format!("{}AAAA", prefix);
        let second = format!("{}BBBB", prefix);

        let result = new_user("new_user", &second).into_record(&service);
        assert!(matches!(result, Err(DomainError::InvalidArgument(_))));

        let mut user = create_test_user();
        user.set_password_encoded("Strong1!", &service).unwrap();
        let before = user.password().clone();

        let result = user.set_password_encoded(&second, &service);
        assert!(matches!(result, Err(DomainError::InvalidArgument(_))));
        assert_eq!(user.password(), &before);
        assert!(!user.verify_password(&first, &service));
        assert!(!user.verify_password(&second, &service));
    }

    #[test]
    fn test_new_user_debug_redacts_password() {
        let input = new_user("new_user", "Strong1!");
        assert!(!format!("{:?}", input).contains("Strong1!"));
    }

    #[test]
    fn test_storage_round_trip_requires_hash() {
        let service = fast_service();
        let mut user = create_test_user();

        assert!(matches!(user.to_stored(), Err(DomainError::InvalidArgument(_))));

        user.set_password_encoded("Strong1!", &service).unwrap();
        user.id = Some(7);
        let restored = UserRecord::from(user.to_stored().unwrap());

        assert_eq!(restored.id, Some(7));
        assert!(restored.verify_password("Strong1!", &service));
        assert_eq!(restored.created_at(), user.created_at());
    }

    #[test]
    fn test_loaded_row_never_violates_timestamp_order() {
        let created = Utc::now();
        let row = StoredUser {
            id: Some(1),
            username: "loaded".to_string(),
            email: "loaded@example.com".to_string(),
            password_hash: "$2b$04$stored".to_string(),
            is_active: false,
            bio: None,
            created_at: created,
            updated_at: created - chrono::Duration::seconds(5),
        };

        let user = UserRecord::from(row);
        assert_eq!(user.updated_at(), user.created_at());
        assert!(!user.is_active);
    }

    #[test]
    fn test_response_hides_password() {
        let user = create_test_user();
        let json = serde_json::to_string(&UserResponse::from(&user)).unwrap();

        assert!(json.contains("\"username\":\"test_user\""));
        assert!(!json.contains("Initial1!"));
        assert!(!json.contains("bio"));
    }
}
