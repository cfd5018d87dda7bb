//! Users of the game API, their credentials and their authorizations.
//!
//! Passwords never leave [`Credentials`] in clear text: they are zeroized on
//! drop and stored as a salted SHA-256 digest.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;
use zeroize::Zeroizing;

/// A registered API user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password: PasswordHash,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

/// Validation failure for user supplied credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsError {
    /// Email was blank once trimmed or has no `@`.
    InvalidEmail,
    /// Password was empty.
    EmptyPassword,
}

impl fmt::Display for CredentialsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email must be a non-empty address"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for CredentialsError {}

/// Validated email and password pair.
///
/// ## Invariants
/// - `email` is trimmed and contains an `@`.
/// - `password` is non-empty and kept verbatim.
///
/// # Examples
/// ```
/// use stellar_backend::domain::Credentials;
///
/// let creds = Credentials::try_from_parts(" ada@example.com ", "hunter2").unwrap();
/// assert_eq!(creds.email(), "ada@example.com");
/// assert_eq!(creds.password(), "hunter2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: Zeroizing<String>,
}

impl Credentials {
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsError> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(CredentialsError::InvalidEmail);
        }
        if password.is_empty() {
            return Err(CredentialsError::EmptyPassword);
        }
        Ok(Self {
            email: email.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Salted SHA-256 digest of a password, stored as `salt$digest` in hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash `password` under a fresh random salt.
    pub fn new(password: &str) -> Self {
        let salt = Uuid::new_v4().simple().to_string();
        let digest = digest(&salt, password);
        Self(format!("{salt}${digest}"))
    }

    /// Rebuild a hash read back from storage.
    pub fn from_stored(stored: impl Into<String>) -> Self {
        Self(stored.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `password` hashes to this value.
    pub fn verify(&self, password: &str) -> bool {
        self.0
            .split_once('$')
            .is_some_and(|(salt, expected)| digest(salt, password) == expected)
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Permissions granted to a user on one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Acl {
    pub id: Uuid,
    pub user: Uuid,
    pub resource: String,
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// One named quota, e.g. the number of players a user may register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Limit {
    pub name: String,
    pub value: String,
}

/// Everything a gateway needs to authorize calls made with one key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Authorization {
    pub acls: Vec<Acl>,
    pub limits: Vec<Limit>,
}
