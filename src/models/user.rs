//! User-related domain models
//!
//! This module defines users, their credentials and their role assignments.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::password::{hash_password, verify_password};
use crate::error::AuthError;

/// Closed set of role names a user can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleName {
    /// Registered human user
    User,
    /// Pre-provisioned anonymous account
    Anonymous,
}

impl RoleName {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::User => "USER",
            RoleName::Anonymous => "ANONYMOUS",
        }
    }
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleName {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(RoleName::User),
            "ANONYMOUS" => Ok(RoleName::Anonymous),
            other => Err(AuthError::Validation(format!(
                "unsupported role name: {}",
                other
            ))),
        }
    }
}

/// A role granted to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// Owning user
    pub user_id: String,

    /// Granted role
    pub name: RoleName,

    /// When the role was granted
    pub created_at: DateTime<Utc>,

    /// Soft-delete marker
    pub deleted_at: Option<DateTime<Utc>>,
}

impl RoleAssignment {
    /// Grant an already-validated role
    pub fn new(user_id: impl Into<String>, name: RoleName) -> Self {
        Self {
            user_id: user_id.into(),
            name,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    /// Grant a role by name, validating it against [`RoleName`]
    pub fn assign(user_id: impl Into<String>, name: &str) -> Result<Self, AuthError> {
        let name = RoleName::from_str(name)?;
        Ok(Self::new(user_id, name))
    }

    /// Whether the assignment currently grants its role
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Kind of authentication secret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialKind {
    /// Salted password hash
    Password,
}

impl FromStr for CredentialKind {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PASSWORD" => Ok(CredentialKind::Password),
            other => Err(AuthError::Validation(format!(
                "unsupported credential type: {}",
                other
            ))),
        }
    }
}

/// A user's authentication secret
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Credential kind
    pub kind: CredentialKind,

    /// Salted one-way hash (PHC format)
    pub hash: String,

    /// Owning user
    pub user_id: String,

    /// When the credential was created
    pub created_at: DateTime<Utc>,

    /// When the credential was last changed
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    /// Create a password credential from plaintext
    pub fn password(user_id: impl Into<String>, plaintext: &str) -> Result<Self, AuthError> {
        let hash = hash_password(plaintext)?;
        let now = Utc::now();
        Ok(Self {
            kind: CredentialKind::Password,
            hash: hash.into_string(),
            user_id: user_id.into(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Check a candidate password against this credential
    pub fn is_password_valid(&self, candidate: &str) -> bool {
        match self.kind {
            CredentialKind::Password => verify_password(&self.hash, candidate),
        }
    }
}

/// User aggregate as returned by the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID
    pub id: String,

    /// Display name
    pub username: String,

    /// Login email
    pub email: String,

    /// Whether the account may log in
    pub enabled: bool,

    /// Whether the email was confirmed
    pub verified: bool,

    /// Whether this is a pre-provisioned anonymous account
    pub anonymous: bool,

    /// Role assignments
    #[serde(default)]
    pub roles: Vec<RoleAssignment>,

    /// Credentials (never serialized, so hashes stay out of caches)
    #[serde(default, skip_serializing)]
    pub credentials: Vec<Credential>,

    /// When the user was created
    pub created_at: DateTime<Utc>,

    /// When the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a regular user with a password credential and the USER role
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: &str,
    ) -> Result<Self, AuthError> {
        let username = username.into();
        if username.chars().count() < 3 {
            return Err(AuthError::Validation(
                "username must be at least 3 characters long".to_string(),
            ));
        }

        let email = email.into();
        if email.trim().is_empty() {
            return Err(AuthError::Validation(
                "email address cannot be empty".to_string(),
            ));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let credential = Credential::password(&id, password)?;
        let now = Utc::now();

        Ok(Self {
            roles: vec![RoleAssignment::new(&id, RoleName::User)],
            credentials: vec![credential],
            id,
            username,
            email: email.trim().to_string(),
            enabled: false,
            verified: false,
            anonymous: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Create an anonymous user with random identifiers and the ANONYMOUS role
    pub fn new_anonymous() -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        Self {
            roles: vec![RoleAssignment::new(&id, RoleName::Anonymous)],
            credentials: Vec::new(),
            username: uuid::Uuid::new_v4().to_string(),
            email: uuid::Uuid::new_v4().to_string(),
            id,
            enabled: true,
            verified: true,
            anonymous: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether any password credential matches the candidate
    pub fn is_password_valid(&self, candidate: &str) -> bool {
        self.credentials
            .iter()
            .any(|c| c.kind == CredentialKind::Password && c.is_password_valid(candidate))
    }

    /// Active role names
    pub fn role_names(&self) -> Vec<RoleName> {
        self.roles
            .iter()
            .filter(|r| r.is_active())
            .map(|r| r.name)
            .collect()
    }

    /// Whether the user currently holds `role`
    pub fn has_role(&self, role: RoleName) -> bool {
        self.roles.iter().any(|r| r.is_active() && r.name == role)
    }

    /// Mark the account as confirmed and enabled
    pub fn confirm(&mut self) {
        self.verified = true;
        self.enabled = true;
        self.updated_at = Utc::now();
    }
}
