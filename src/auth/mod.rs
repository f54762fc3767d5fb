//! Authentication system for session-kernel
//!
//! This module provides the credential and session core:
//! - Password hashing and verification
//! - Role membership checks
//! - Token issuance and verification
//! - The session orchestrator (login, refresh, authenticate, logout)
//! - Per-key token bucket rate limiting

pub mod password;
pub mod ratelimit;
pub mod roles;
pub mod session;
pub mod token;

pub use password::{hash_password, verify_password, HashedSecret, MIN_PASSWORD_LENGTH};
pub use ratelimit::{RateLimitConfig, TokenBucketLimiter};
pub use roles::{authorize, has_any};
pub use session::{AuthSession, SessionConfig, CLIENT_CACHE_PREFIX, USER_CACHE_PREFIX};
pub use token::{cache_key, issue, issue_pair, user_key_prefix, validate, Claims, TokenConfig};
