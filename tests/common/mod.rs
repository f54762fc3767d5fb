//! Common test utilities and helpers for integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use session_kernel::auth::{AuthSession, SessionConfig, TokenConfig};
use session_kernel::cache::MemorySessionCache;
use session_kernel::clock::ManualClock;
use session_kernel::directory::MemoryDirectory;
use session_kernel::models::{Client, ClientType, User};

pub const TEST_SECRET: &str = "integration-secret-0123456789abcdef";
pub const WEB_CLIENT_SECRET: &str = "web-client-secret";
pub const IOS_CLIENT_SECRET: &str = "ios-client-secret";
pub const USER_EMAIL: &str = "a@b.com";
pub const USER_PASSWORD: &str = "goodpass";
pub const ANONYMOUS_EMAIL: &str = "anon@b.com";

/// Everything a session test needs, wired to one manual clock
pub struct TestContext {
    pub session: AuthSession<MemoryDirectory>,
    pub directory: Arc<MemoryDirectory>,
    pub cache: Arc<MemorySessionCache>,
    pub clock: Arc<ManualClock>,
    pub user: User,
    pub anonymous: User,
    pub web: Client,
    pub ios: Client,
}

/// Create a test session configuration with short lifetimes
pub fn create_test_config() -> SessionConfig {
    SessionConfig {
        tokens: TokenConfig {
            secret: TEST_SECRET.to_string(),
            access_ttl: Duration::from_secs(60),
            refresh_ttl: Duration::from_secs(3600),
        },
        client_cache_ttl: Duration::from_secs(3600),
        user_cache_ttl: Duration::from_secs(300),
        operation_timeout: Duration::from_secs(2),
    }
}

/// Create a clock frozen on a whole second
pub fn create_test_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
    ))
}

/// Create a directory seeded with a password user, an anonymous user and two clients
pub async fn create_test_context() -> TestContext {
    let clock = create_test_clock();
    let directory = Arc::new(MemoryDirectory::new());
    let cache = Arc::new(MemorySessionCache::new(clock.clone()));

    let mut user = User::new("alice", USER_EMAIL, USER_PASSWORD).expect("valid user");
    user.confirm();

    let mut anonymous = User::new_anonymous();
    anonymous.email = ANONYMOUS_EMAIL.to_string();

    let web = Client::new(ClientType::web(), WEB_CLIENT_SECRET);
    let ios = Client::new(ClientType::ios(), IOS_CLIENT_SECRET);

    directory.insert_user(user.clone()).await;
    directory.insert_user(anonymous.clone()).await;
    directory.insert_client(web.clone()).await;
    directory.insert_client(ios.clone()).await;

    let session = AuthSession::new(
        directory.clone(),
        cache.clone(),
        clock.clone(),
        create_test_config(),
    );

    TestContext {
        session,
        directory,
        cache,
        clock,
        user,
        anonymous,
        web,
        ios,
    }
}
