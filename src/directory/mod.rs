//! User directory layer
//!
//! This module defines the persistence contract the session core reads users and
//! clients through, plus an in-memory implementation.

pub mod memory;

pub use memory::MemoryDirectory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DirectoryError;
use crate::models::{Client, User};

/// Directory trait for user and client lookups
///
/// Absence is reported as `Ok(None)`, never as an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    // =========================================================================
    // User operations
    // =========================================================================

    /// Find a user by login email, including credentials
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError>;

    /// Find a user by ID with role assignments loaded
    async fn find_with_roles(&self, id: &str) -> Result<Option<User>, DirectoryError>;

    // =========================================================================
    // Client operations
    // =========================================================================

    /// Find a client by its secret
    ///
    /// Soft-deleted clients are still returned; callers decide how to treat them.
    async fn find_client_by_secret(&self, secret: &str) -> Result<Option<Client>, DirectoryError>;

    /// Mark a client as deleted at `at`
    ///
    /// Returns `Ok(false)` if the secret is unknown.
    async fn soft_delete_client(
        &self,
        secret: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, DirectoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClientType;

    // Test 1: MockUserDirectory returns a client
    #[tokio::test]
    async fn test_mock_directory_find_client() {
        let mut mock = MockUserDirectory::new();

        mock.expect_find_client_by_secret()
            .withf(|secret| secret == "s3cret")
            .returning(|_| Ok(Some(Client::new(ClientType::web(), "s3cret"))));

        let client = mock.find_client_by_secret("s3cret").await.unwrap();
        assert_eq!(client.unwrap().client_type, ClientType::web());
    }

    // Test 2: MockUserDirectory reports absence as None
    #[tokio::test]
    async fn test_mock_directory_absent_user() {
        let mut mock = MockUserDirectory::new();

        mock.expect_find_by_email().returning(|_| Ok(None));

        assert!(mock.find_by_email("x@y.z").await.unwrap().is_none());
    }
}
