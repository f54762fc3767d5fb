//! Token issuance and verification
//!
//! Tokens are compact JWTs signed with HMAC-SHA256. The signed payload is the narrow
//! [`Claims`] struct; the domain value handed around the crate is
//! [`Token`](crate::models::Token), and [`Claims::from`] is the only bridge between them.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::{AuthError, UnauthorizedReason};
use crate::models::{ClientType, Token, TokenKind, TokenPair};

/// Signing algorithm for every issued token
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Signed JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Unique token ID
    pub jti: String,

    /// Owning user
    #[serde(rename = "uid")]
    pub user_id: String,

    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
}

impl Claims {
    /// Expiry as a timestamp, `None` if out of range
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

impl From<&Token> for Claims {
    fn from(token: &Token) -> Self {
        Self {
            jti: token.id.clone(),
            user_id: token.user_id.clone(),
            exp: token.expires_at.timestamp(),
        }
    }
}

/// Signing secret and lifetimes for token pairs
#[derive(Clone, PartialEq, Eq)]
pub struct TokenConfig {
    /// HMAC secret shared by access and refresh tokens
    pub secret: String,

    /// Access token lifetime
    pub access_ttl: Duration,

    /// Refresh token lifetime
    pub refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_ttl: Duration::from_secs(900),       // 15 minutes
            refresh_ttl: Duration::from_secs(604_800), // 7 days
        }
    }
}

/// Cache key marking the live token of `kind` for one user and client
///
/// Format: `uat:<user>:<client>` or `urt:<user>:<client>`.
pub fn cache_key(kind: TokenKind, user_id: &str, client_type: &ClientType) -> String {
    format!("{}:{}:{}", kind.cache_prefix(), user_id, client_type)
}

/// Prefix covering every client's key of `kind` for one user
pub fn user_key_prefix(kind: TokenKind, user_id: &str) -> String {
    format!("{}:{}", kind.cache_prefix(), user_id)
}

/// Issue a single signed token
///
/// Expiry is truncated to whole seconds, so `ttl` must be at least one second.
pub fn issue(
    user_id: &str,
    client_type: &ClientType,
    kind: TokenKind,
    secret: &str,
    ttl: Duration,
    clock: &dyn Clock,
) -> Result<Token, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::Validation("signing secret is empty".to_string()));
    }
    if user_id.is_empty() {
        return Err(AuthError::Validation("user id is empty".to_string()));
    }
    if client_type.is_empty() {
        return Err(AuthError::Validation("client type is empty".to_string()));
    }
    if ttl.as_secs() == 0 {
        return Err(AuthError::Validation(
            "token ttl must be at least one second".to_string(),
        ));
    }

    let now = clock.now();
    let expires_at = i64::try_from(ttl.as_secs())
        .ok()
        .and_then(|secs| now.timestamp().checked_add(secs))
        .and_then(|exp| DateTime::from_timestamp(exp, 0))
        .ok_or_else(|| AuthError::Validation("token ttl out of range".to_string()))?;

    let mut token = Token {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        kind,
        client_type: client_type.clone(),
        issued_at: now,
        expires_at,
        raw: String::new(),
    };

    token.raw = encode(
        &Header::new(SIGNING_ALGORITHM),
        &Claims::from(&token),
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Internal(format!("failed to sign {} token: {}", kind, e)))?;

    Ok(token)
}

/// Issue an access and a refresh token for the same user and client
///
/// All-or-nothing: if either issuance fails no pair is returned.
pub fn issue_pair(
    user_id: &str,
    client_type: &ClientType,
    config: &TokenConfig,
    clock: &dyn Clock,
) -> Result<TokenPair, AuthError> {
    let access = issue(
        user_id,
        client_type,
        TokenKind::Access,
        &config.secret,
        config.access_ttl,
        clock,
    )?;
    let refresh = issue(
        user_id,
        client_type,
        TokenKind::Refresh,
        &config.secret,
        config.refresh_ttl,
        clock,
    )?;

    Ok(TokenPair { access, refresh })
}

/// Verify signature and expiry of a raw token
///
/// # Errors
///
/// - [`UnauthorizedReason::MalformedToken`] for unparseable tokens or a non-HS256 header
/// - [`UnauthorizedReason::InvalidSignature`] when signed with another secret
/// - [`UnauthorizedReason::TokenExpired`] once the clock is past `exp`
pub fn validate(raw: &str, secret: &str, clock: &dyn Clock) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::Validation("signing secret is empty".to_string()));
    }
    if raw.is_empty() {
        return Err(AuthError::Unauthorized(UnauthorizedReason::MalformedToken));
    }

    // Expiry is checked below against the injected clock.
    let mut validation = Validation::new(SIGNING_ALGORITHM);
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);

    let data = decode::<Claims>(
        raw,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => AuthError::Unauthorized(UnauthorizedReason::InvalidSignature),
        _ => AuthError::Unauthorized(UnauthorizedReason::MalformedToken),
    })?;

    let claims = data.claims;
    let expires_at = claims
        .expires_at()
        .ok_or(AuthError::Unauthorized(UnauthorizedReason::MalformedToken))?;

    if clock.now() > expires_at {
        return Err(AuthError::Unauthorized(UnauthorizedReason::TokenExpired));
    }

    Ok(claims)
}
