//! Registered calling applications

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque client application type (`WEB`, `IOS`, `ANDROID`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientType(String);

impl ClientType {
    /// Wrap an arbitrary client type name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn web() -> Self {
        Self::new("WEB")
    }

    pub fn ios() -> Self {
        Self::new("IOS")
    }

    pub fn android() -> Self {
        Self::new("ANDROID")
    }

    /// The raw name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ClientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A registered calling application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Client type (primary key)
    pub client_type: ClientType,

    /// Shared secret presented on every request (unique)
    pub client_secret: String,

    /// When the client was registered
    pub created_at: DateTime<Utc>,

    /// When the client was last updated
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Client {
    /// Register a new client
    pub fn new(client_type: ClientType, client_secret: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            client_type,
            client_secret: client_secret.into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Mark the client as deleted
    pub fn with_deleted_at(mut self, deleted_at: DateTime<Utc>) -> Self {
        self.deleted_at = Some(deleted_at);
        self
    }

    /// Whether the client may still be used
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_type_constructors() {
        assert_eq!(ClientType::web().as_str(), "WEB");
        assert_eq!(ClientType::ios().as_str(), "IOS");
        assert_eq!(ClientType::android().as_str(), "ANDROID");
        assert_eq!(ClientType::from("DESKTOP").to_string(), "DESKTOP");
        assert!(ClientType::new("").is_empty());
    }

    #[test]
    fn test_client_type_serializes_as_plain_string() {
        let json = serde_json::to_string(&ClientType::web()).unwrap();
        assert_eq!(json, "\"WEB\"");
    }

    #[test]
    fn test_client_is_active() {
        let client = Client::new(ClientType::web(), "s3cret");
        assert!(client.is_active());

        let deleted = client.with_deleted_at(Utc::now());
        assert!(!deleted.is_active());
    }

    #[test]
    fn test_client_json_round_trip_keeps_deleted_marker() {
        let client = Client::new(ClientType::ios(), "s3cret").with_deleted_at(Utc::now());
        let json = serde_json::to_vec(&client).unwrap();
        let restored: Client = serde_json::from_slice(&json).unwrap();

        assert_eq!(restored, client);
        assert!(!restored.is_active());
    }
}
