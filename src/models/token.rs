//! Token-related domain models
//!
//! This module defines the issued credential value objects. The signed wire format
//! lives in [`crate::auth::token::Claims`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::client::ClientType;

/// Access or refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    /// Short-lived credential presented on every request
    Access,
    /// Long-lived credential used only to mint a new pair
    Refresh,
}

impl TokenKind {
    /// Fixed cache-key prefix for this kind
    pub fn cache_prefix(&self) -> &'static str {
        match self {
            TokenKind::Access => "uat",
            TokenKind::Refresh => "urt",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Access => f.write_str("ACCESS"),
            TokenKind::Refresh => f.write_str("REFRESH"),
        }
    }
}

/// A signed, time-bounded credential
///
/// Immutable once issued. Revocation removes its cache marker, not the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Unique token ID (`jti`)
    pub id: String,

    /// Owning user
    pub user_id: String,

    /// Access or refresh
    pub kind: TokenKind,

    /// Issuing client type
    pub client_type: ClientType,

    /// When the token was issued
    pub issued_at: DateTime<Utc>,

    /// When the token stops validating
    pub expires_at: DateTime<Utc>,

    /// Compact signed representation handed to the caller
    pub raw: String,
}

impl Token {
    /// Time left before expiry, zero once expired
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).to_std().unwrap_or(Duration::ZERO)
    }

    /// Whether the token has expired at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Access and refresh token minted together for one user and client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token
    pub access: Token,

    /// Long-lived refresh token
    pub refresh: Token,
}

impl TokenPair {
    /// Owning user
    pub fn user_id(&self) -> &str {
        &self.access.user_id
    }

    /// Issuing client type
    pub fn client_type(&self) -> &ClientType {
        &self.access.client_type
    }
}
