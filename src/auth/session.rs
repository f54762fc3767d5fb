//! Session orchestrator
//!
//! [`AuthSession`] drives the per-(user, client) session state machine:
//!
//! - `login` / `login_anonymous` / `refresh` revoke the pair's previous tokens, mint a
//!   fresh [`TokenPair`] and record both presence markers before returning.
//! - `authenticate` verifies signature and expiry, then requires the access marker.
//! - `logout` / `logout_all` remove markers for one client or for every client.
//!
//! The session cache is an allow-list: a present marker means valid, anything else is
//! revoked or expired.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::cache::{get_json, put_json, SessionCache};
use crate::clock::Clock;
use crate::directory::UserDirectory;
use crate::error::{AuthError, UnauthorizedReason};
use crate::models::{Client, ClientType, RoleName, TokenKind, TokenPair, User};

use super::roles;
use super::token::{self, cache_key, user_key_prefix, TokenConfig};

/// Cache prefix for client lookups keyed by secret
pub const CLIENT_CACHE_PREFIX: &str = "client";

/// Cache prefix for user lookups keyed by ID
pub const USER_CACHE_PREFIX: &str = "user";

/// Value stored under token presence markers
const MARKER_VALUE: &[u8] = b"1";

/// Runtime settings for [`AuthSession`]
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Signing secret and token lifetimes
    pub tokens: TokenConfig,

    /// How long a resolved client stays cached
    pub client_cache_ttl: Duration,

    /// How long a resolved user stays cached on the authenticate path
    pub user_cache_ttl: Duration,

    /// Deadline for every cache and directory call
    pub operation_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tokens: TokenConfig::default(),
            client_cache_ttl: Duration::from_secs(3600), // 1 hour
            user_cache_ttl: Duration::from_secs(300),    // 5 minutes
            operation_timeout: Duration::from_secs(2),
        }
    }
}

/// Token lifecycle and client resolution
pub struct AuthSession<D: UserDirectory> {
    directory: Arc<D>,
    cache: Arc<dyn SessionCache>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
}

impl<D: UserDirectory> AuthSession<D> {
    /// Create a new session orchestrator
    pub fn new(
        directory: Arc<D>,
        cache: Arc<dyn SessionCache>,
        clock: Arc<dyn Clock>,
        config: SessionConfig,
    ) -> Self {
        Self {
            directory,
            cache,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Resolve the calling application from its secret
    ///
    /// Cache first, then the directory. A soft-deleted client is reported as not found
    /// whichever path produced it. Populating the cache is best-effort.
    pub async fn resolve_client(&self, secret: &str) -> Result<Client, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Unauthorized(
                UnauthorizedReason::MissingClientSecret,
            ));
        }

        let cached: Option<Client> = self
            .bounded(
                "client cache read",
                get_json(self.cache.as_ref(), CLIENT_CACHE_PREFIX, secret),
            )
            .await?;

        if let Some(client) = cached {
            if !client.is_active() {
                debug!(client_type = %client.client_type, "Cached client is deleted");
                return Err(AuthError::NotFound("client".to_string()));
            }
            return Ok(client);
        }

        let client = self
            .bounded(
                "client lookup",
                self.directory.find_client_by_secret(secret),
            )
            .await?
            .ok_or_else(|| AuthError::NotFound("client".to_string()))?;

        if !client.is_active() {
            debug!(client_type = %client.client_type, "Client is deleted");
            return Err(AuthError::NotFound("client".to_string()));
        }

        if let Err(e) = self
            .bounded(
                "client cache write",
                put_json(
                    self.cache.as_ref(),
                    CLIENT_CACHE_PREFIX,
                    secret,
                    self.config.client_cache_ttl,
                    &client,
                ),
            )
            .await
        {
            warn!(client_type = %client.client_type, error = %e, "Failed to cache client");
        }

        Ok(client)
    }

    /// Soft-delete a client and drop its cached copy
    ///
    /// The cached entry is evicted before returning, so the secret stops resolving at
    /// once rather than when the cache TTL runs out.
    pub async fn delete_client(&self, secret: &str) -> Result<(), AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Unauthorized(
                UnauthorizedReason::MissingClientSecret,
            ));
        }

        let deleted = self
            .bounded(
                "client delete",
                self.directory.soft_delete_client(secret, self.clock.now()),
            )
            .await?;

        if !deleted {
            return Err(AuthError::NotFound("client".to_string()));
        }

        self.evict_cached_client(secret).await?;
        info!("Client deleted");
        Ok(())
    }

    /// Drop a cached client so the next resolution reads the directory
    pub async fn evict_cached_client(&self, secret: &str) -> Result<(), AuthError> {
        self.bounded(
            "client cache evict",
            self.cache.evict(CLIENT_CACHE_PREFIX, secret),
        )
        .await
    }

    /// Log in with email and password
    ///
    /// Any session this user already has on the same client is revoked first.
    pub async fn login(
        &self,
        client: &Client,
        email: &str,
        password: &str,
    ) -> Result<TokenPair, AuthError> {
        let user = self.find_by_email(email).await?;

        let candidate = password.to_string();
        let (user, valid) = tokio::task::spawn_blocking(move || {
            let valid = user.is_password_valid(&candidate);
            (user, valid)
        })
        .await
        .map_err(|e| AuthError::Internal(format!("password verification failed: {}", e)))?;

        if !valid {
            info!(user_id = %user.id, "Login rejected: invalid credentials");
            return Err(AuthError::Unauthorized(
                UnauthorizedReason::InvalidCredentials,
            ));
        }

        self.issue_session(client, &user.id).await
    }

    /// Log in a pre-provisioned anonymous account
    ///
    /// Skips password verification, so only accounts flagged anonymous are accepted.
    pub async fn login_anonymous(
        &self,
        client: &Client,
        email: &str,
    ) -> Result<TokenPair, AuthError> {
        let user = self.find_by_email(email).await?;

        if !user.anonymous {
            info!(user_id = %user.id, "Anonymous login rejected for regular account");
            return Err(AuthError::Unauthorized(
                UnauthorizedReason::InvalidCredentials,
            ));
        }

        self.issue_session(client, &user.id).await
    }

    /// Exchange a refresh token for a new pair
    ///
    /// Both previous tokens are revoked, so each refresh token works once.
    pub async fn refresh(&self, client: &Client, raw: &str) -> Result<TokenPair, AuthError> {
        let claims = token::validate(raw, &self.config.tokens.secret, self.clock.as_ref())?;

        self.require_marker(
            TokenKind::Refresh,
            &claims.user_id,
            &client.client_type,
            &claims.jti,
        )
        .await?;

        let user = self
            .bounded(
                "user lookup",
                self.directory.find_with_roles(&claims.user_id),
            )
            .await?
            .ok_or(AuthError::Unauthorized(
                UnauthorizedReason::InvalidCredentials,
            ))?;

        self.issue_session(client, &user.id).await
    }

    /// Resolve the user behind an access token
    ///
    /// Fails closed: if the cache cannot confirm the marker, the call fails.
    pub async fn authenticate(&self, client: &Client, raw: &str) -> Result<User, AuthError> {
        let claims = token::validate(raw, &self.config.tokens.secret, self.clock.as_ref())?;

        self.require_marker(
            TokenKind::Access,
            &claims.user_id,
            &client.client_type,
            &claims.jti,
        )
        .await?;

        self.cached_user(&claims.user_id).await
    }

    /// Revoke this user's tokens on one client
    pub async fn logout(&self, user_id: &str, client_type: &ClientType) -> Result<(), AuthError> {
        if user_id.is_empty() {
            return Err(AuthError::Validation("user id is empty".to_string()));
        }

        self.revoke_client_session(user_id, client_type).await?;
        info!(user_id = user_id, client_type = %client_type, "Logged out");
        Ok(())
    }

    /// Revoke this user's tokens on every client
    pub async fn logout_all(&self, user_id: &str) -> Result<(), AuthError> {
        if user_id.is_empty() {
            return Err(AuthError::Validation("user id is empty".to_string()));
        }

        let mut evicted = 0;
        for kind in [TokenKind::Access, TokenKind::Refresh] {
            evicted += self
                .bounded(
                    "token revoke",
                    self.cache.evict_by_prefix(&user_key_prefix(kind, user_id)),
                )
                .await?;
        }

        info!(user_id = user_id, evicted, "Logged out of all clients");
        Ok(())
    }

    /// Drop a cached user so role changes are picked up on the next request
    pub async fn evict_cached_user(&self, user_id: &str) -> Result<(), AuthError> {
        self.bounded(
            "user cache evict",
            self.cache.evict(USER_CACHE_PREFIX, user_id),
        )
        .await
    }

    /// Require that `user` holds at least one of `required`
    pub fn authorize(&self, user: &User, required: &[RoleName]) -> Result<(), AuthError> {
        roles::authorize(user, required)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::Validation(
                "email address cannot be empty".to_string(),
            ));
        }

        self.bounded("user lookup", self.directory.find_by_email(email))
            .await?
            .ok_or_else(|| AuthError::NotFound("user".to_string()))
    }

    async fn cached_user(&self, user_id: &str) -> Result<User, AuthError> {
        let cached: Option<User> = self
            .bounded(
                "user cache read",
                get_json(self.cache.as_ref(), USER_CACHE_PREFIX, user_id),
            )
            .await?;

        if let Some(user) = cached {
            return Ok(user);
        }

        let user = self
            .bounded("user lookup", self.directory.find_with_roles(user_id))
            .await?
            .ok_or(AuthError::Unauthorized(
                UnauthorizedReason::InvalidCredentials,
            ))?;

        if let Err(e) = self
            .bounded(
                "user cache write",
                put_json(
                    self.cache.as_ref(),
                    USER_CACHE_PREFIX,
                    user_id,
                    self.config.user_cache_ttl,
                    &user,
                ),
            )
            .await
        {
            warn!(user_id = user_id, error = %e, "Failed to cache user");
        }

        Ok(user)
    }

    async fn require_marker(
        &self,
        kind: TokenKind,
        user_id: &str,
        client_type: &ClientType,
        jti: &str,
    ) -> Result<(), AuthError> {
        let present = self
            .bounded(
                "token marker check",
                self.cache.exists(&cache_key(kind, user_id, client_type), jti),
            )
            .await?;

        if present {
            Ok(())
        } else {
            debug!(user_id = user_id, client_type = %client_type, kind = %kind, "Token revoked");
            Err(AuthError::Unauthorized(UnauthorizedReason::TokenRevoked))
        }
    }

    async fn revoke_client_session(
        &self,
        user_id: &str,
        client_type: &ClientType,
    ) -> Result<(), AuthError> {
        for kind in [TokenKind::Access, TokenKind::Refresh] {
            self.bounded(
                "token revoke",
                self.cache
                    .evict_by_prefix(&cache_key(kind, user_id, client_type)),
            )
            .await?;
        }
        Ok(())
    }

    /// Revoke, issue, then record both markers; all writes complete before returning
    async fn issue_session(&self, client: &Client, user_id: &str) -> Result<TokenPair, AuthError> {
        if !client.is_active() {
            return Err(AuthError::NotFound("client".to_string()));
        }

        self.revoke_client_session(user_id, &client.client_type)
            .await?;

        let pair = token::issue_pair(
            user_id,
            &client.client_type,
            &self.config.tokens,
            self.clock.as_ref(),
        )?;

        let now = self.clock.now();
        for token in [&pair.access, &pair.refresh] {
            self.bounded(
                "token marker write",
                self.cache.set(
                    &cache_key(token.kind, user_id, &token.client_type),
                    &token.id,
                    token.remaining(now),
                    Bytes::from_static(MARKER_VALUE),
                ),
            )
            .await?;
        }

        info!(user_id = user_id, client_type = %client.client_type, "Issued token pair");
        Ok(pair)
    }

    /// Run a collaborator call under the operation deadline
    async fn bounded<T, E>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, E>>,
    ) -> Result<T, AuthError>
    where
        E: Into<AuthError>,
    {
        match tokio::time::timeout(self.config.operation_timeout, fut).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(AuthError::Internal(format!(
                "{} timed out after {:?}",
                operation, self.config.operation_timeout
            ))),
        }
    }
}
