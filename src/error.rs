//! Error types for session-kernel
//!
//! This module defines the error taxonomy surfaced to callers (`AuthError`) and the
//! collaborator-level errors it absorbs. All error types use `thiserror`.

use thiserror::Error;

/// Why a request was refused as unauthorized
///
/// The variants stay distinguishable inside the process (logging, refresh guidance),
/// but [`AuthError::public_message`] collapses them for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthorizedReason {
    /// Token could not be parsed or used an unexpected algorithm
    MalformedToken,
    /// Token signature did not verify against the secret
    InvalidSignature,
    /// Token expiry is in the past
    TokenExpired,
    /// Token presence marker is absent from the session cache
    TokenRevoked,
    /// Wrong password or unusable account
    InvalidCredentials,
    /// No client secret was presented
    MissingClientSecret,
}

impl std::fmt::Display for UnauthorizedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            UnauthorizedReason::MalformedToken => "malformed token",
            UnauthorizedReason::InvalidSignature => "invalid token signature",
            UnauthorizedReason::TokenExpired => "token expired",
            UnauthorizedReason::TokenRevoked => "token revoked",
            UnauthorizedReason::InvalidCredentials => "invalid credentials",
            UnauthorizedReason::MissingClientSecret => "missing client secret",
        };
        f.write_str(text)
    }
}

/// Errors returned by the session core
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    /// Malformed input such as an empty secret or a short password
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Bad, expired or revoked token, or wrong credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(UnauthorizedReason),

    /// Unknown user or client
    #[error("Not found: {0}")]
    NotFound(String),

    /// Role check failed
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Cache or persistence failure not attributable to caller input
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Message safe to return to an untrusted caller
    pub fn public_message(&self) -> String {
        match self {
            AuthError::Validation(msg) => msg.clone(),
            AuthError::Unauthorized(_) => "Unauthorized".to_string(),
            AuthError::NotFound(what) => format!("{} not found", what),
            AuthError::Forbidden(_) => "Insufficient permissions".to_string(),
            AuthError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// True when the failure was an expired token, so the caller may try a refresh
    pub fn is_expired(&self) -> bool {
        matches!(
            self,
            AuthError::Unauthorized(UnauthorizedReason::TokenExpired)
        )
    }

    /// Reason for an unauthorized failure, if this is one
    pub fn unauthorized_reason(&self) -> Option<UnauthorizedReason> {
        match self {
            AuthError::Unauthorized(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Session cache errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CacheError {
    /// Backend unreachable or returned an error
    #[error("Cache backend error: {0}")]
    Backend(String),

    /// Value could not be encoded or decoded
    #[error("Cache serialization error: {0}")]
    Serialization(String),

    /// Operation exceeded its deadline
    #[error("Cache operation timed out")]
    Timeout,
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

/// User directory (persistence) errors
///
/// Absence is never an error; lookups return `Ok(None)`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DirectoryError {
    /// Store unreachable
    #[error("Directory unavailable: {0}")]
    Unavailable(String),

    /// Stored record could not be decoded
    #[error("Corrupt directory record: {0}")]
    Corrupt(String),
}

impl From<CacheError> for AuthError {
    fn from(err: CacheError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<DirectoryError> for AuthError {
    fn from(err: DirectoryError) -> Self {
        AuthError::Internal(err.to_string())
    }
}
