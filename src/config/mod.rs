//! Configuration management for session-kernel
//!
//! This module handles loading, parsing, and validating configuration from YAML files
//! and environment variables, and converts it into the runtime structs the core uses.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::{RateLimitConfig, SessionConfig, TokenConfig};

/// Minimum signing secret length, in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

/// Prefix for configuration environment variables
const ENV_PREFIX: &str = "SESSION_KERNEL_";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Token signing configuration
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Session orchestration configuration
    #[serde(default)]
    pub session: SessionSettings,

    /// Session cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Request rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileRead(format!("Failed to read config file: {}", e)))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // First, expand environment variables in the YAML string
        let expanded = expand_env_vars(yaml);
        serde_yaml::from_str(&expanded)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse YAML: {}", e)))
    }

    /// Load configuration from environment variables with prefix SESSION_KERNEL_
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // JWT config from env
        if let Some(secret) = env_var("JWT_SECRET") {
            config.jwt.secret = secret;
        }
        if let Some(ttl) = env_parse("JWT_ACCESS_TTL_SECS")? {
            config.jwt.access_ttl_secs = ttl;
        }
        if let Some(ttl) = env_parse("JWT_REFRESH_TTL_SECS")? {
            config.jwt.refresh_ttl_secs = ttl;
        }

        // Session config from env
        if let Some(ttl) = env_parse("SESSION_CLIENT_CACHE_TTL_SECS")? {
            config.session.client_cache_ttl_secs = ttl;
        }
        if let Some(ttl) = env_parse("SESSION_USER_CACHE_TTL_SECS")? {
            config.session.user_cache_ttl_secs = ttl;
        }
        if let Some(timeout) = env_parse("SESSION_OPERATION_TIMEOUT_MS")? {
            config.session.operation_timeout_ms = timeout;
        }

        // Cache config from env
        if let Some(backend) = env_parse("CACHE_BACKEND")? {
            config.cache.backend = backend;
        }
        if let Some(url) = env_var("CACHE_REDIS_URL") {
            let redis = config.cache.redis.get_or_insert_with(RedisConfig::default);
            redis.url = url;
        }
        if let Some(namespace) = env_var("CACHE_REDIS_NAMESPACE") {
            let redis = config.cache.redis.get_or_insert_with(RedisConfig::default);
            redis.namespace = namespace;
        }

        // Rate limit config from env
        if let Some(capacity) = env_parse("RATE_LIMIT_CAPACITY")? {
            config.rate_limit.capacity = capacity;
        }
        if let Some(rate) = env_parse("RATE_LIMIT_REFILL_PER_SEC")? {
            config.rate_limit.refill_per_sec = rate;
        }
        if let Some(timeout) = env_parse("RATE_LIMIT_IDLE_TIMEOUT_SECS")? {
            config.rate_limit.idle_timeout_secs = timeout;
        }
        if let Some(interval) = env_parse("RATE_LIMIT_SWEEP_INTERVAL_SECS")? {
            config.rate_limit.sweep_interval_secs = interval;
        }

        // Logging config from env
        if let Some(level) = env_var("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(format) = env_var("LOG_FORMAT") {
            config.logging.format = format;
        }

        Ok(config)
    }

    /// Check that the configuration can drive the core
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.is_empty() {
            return Err(ConfigError::MissingRequired("jwt.secret".to_string()));
        }
        if self.jwt.secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::InvalidValue(format!(
                "jwt.secret must be at least {} bytes",
                MIN_SECRET_LENGTH
            )));
        }
        if self.jwt.access_ttl_secs == 0 || self.jwt.refresh_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "jwt token ttls must be positive".to_string(),
            ));
        }
        if self.session.client_cache_ttl_secs == 0 || self.session.user_cache_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "session cache ttls must be positive".to_string(),
            ));
        }
        if self.session.operation_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "session.operation_timeout_ms must be positive".to_string(),
            ));
        }
        if self.cache.backend == CacheBackend::Redis && self.cache.redis.is_none() {
            return Err(ConfigError::MissingRequired("cache.redis".to_string()));
        }
        if self.rate_limit.capacity.is_nan() || self.rate_limit.capacity < 1.0 {
            return Err(ConfigError::InvalidValue(
                "rate_limit.capacity must be at least 1".to_string(),
            ));
        }
        if !self.rate_limit.refill_per_sec.is_finite() || self.rate_limit.refill_per_sec <= 0.0 {
            return Err(ConfigError::InvalidValue(
                "rate_limit.refill_per_sec must be positive".to_string(),
            ));
        }
        if self.rate_limit.idle_timeout_secs == 0 || self.rate_limit.sweep_interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "rate limit idle timeout and sweep interval must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Signing secret and token lifetimes
    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            secret: self.jwt.secret.clone(),
            access_ttl: Duration::from_secs(self.jwt.access_ttl_secs),
            refresh_ttl: Duration::from_secs(self.jwt.refresh_ttl_secs),
        }
    }

    /// Runtime settings for the session orchestrator
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            tokens: self.token_config(),
            client_cache_ttl: Duration::from_secs(self.session.client_cache_ttl_secs),
            user_cache_ttl: Duration::from_secs(self.session.user_cache_ttl_secs),
            operation_timeout: Duration::from_millis(self.session.operation_timeout_ms),
        }
    }

    /// Runtime settings for the rate limiter
    pub fn rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig {
            capacity: self.rate_limit.capacity,
            refill_rate: self.rate_limit.refill_per_sec,
            idle_timeout: Duration::from_secs(self.rate_limit.idle_timeout_secs),
            sweep_interval: Duration::from_secs(self.rate_limit.sweep_interval_secs),
        }
    }
}

/// Token signing configuration
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct JwtConfig {
    /// HMAC signing secret
    #[serde(default)]
    pub secret: String,

    /// Access token lifetime in seconds
    #[serde(default = "default_access_ttl")]
    pub access_ttl_secs: u64,

    /// Refresh token lifetime in seconds
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_ttl_secs: default_access_ttl(),
            refresh_ttl_secs: default_refresh_ttl(),
        }
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish()
    }
}

fn default_access_ttl() -> u64 {
    900 // 15 minutes
}

fn default_refresh_ttl() -> u64 {
    604_800 // 7 days
}

/// Session orchestration configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSettings {
    /// Client lookup cache TTL in seconds
    #[serde(default = "default_client_cache_ttl")]
    pub client_cache_ttl_secs: u64,

    /// User lookup cache TTL in seconds
    #[serde(default = "default_user_cache_ttl")]
    pub user_cache_ttl_secs: u64,

    /// Deadline for each cache or directory call, in milliseconds
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_ms: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            client_cache_ttl_secs: default_client_cache_ttl(),
            user_cache_ttl_secs: default_user_cache_ttl(),
            operation_timeout_ms: default_operation_timeout(),
        }
    }
}

fn default_client_cache_ttl() -> u64 {
    3600 // 1 hour
}

fn default_user_cache_ttl() -> u64 {
    300 // 5 minutes
}

fn default_operation_timeout() -> u64 {
    2000
}

/// Session cache backend
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Process-local map
    #[default]
    Memory,
    /// Shared Redis instance
    Redis,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(CacheBackend::Memory),
            "redis" => Ok(CacheBackend::Redis),
            other => Err(format!("unknown cache backend: {}", other)),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// Cache backend to use
    #[serde(default)]
    pub backend: CacheBackend,

    /// Redis cache configuration (required for the redis backend)
    #[serde(default)]
    pub redis: Option<RedisConfig>,
}

/// Redis cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RedisConfig {
    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Key namespace
    #[serde(default = "default_redis_namespace")]
    pub namespace: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            namespace: default_redis_namespace(),
        }
    }
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_redis_namespace() -> String {
    "session-kernel".to_string()
}

/// Request rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateLimitSettings {
    /// Maximum burst per key
    #[serde(default = "default_capacity")]
    pub capacity: f64,

    /// Tokens added per second
    #[serde(default = "default_refill_per_sec")]
    pub refill_per_sec: f64,

    /// Idle keys older than this are evicted, in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Interval between idle sweeps, in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            refill_per_sec: default_refill_per_sec(),
            idle_timeout_secs: default_idle_timeout(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_capacity() -> f64 {
    20.0
}

fn default_refill_per_sec() -> f64 {
    5.0
}

fn default_idle_timeout() -> u64 {
    3600 // 1 hour
}

fn default_sweep_interval() -> u64 {
    300 // 5 minutes
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

/// Configuration error types
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Error reading configuration file
    #[error("Failed to read configuration file: {0}")]
    FileRead(String),

    /// Error parsing configuration
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Invalid configuration value
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{}{}", ENV_PREFIX, name)).ok()
}

fn env_parse<T>(name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_var(name) {
        Some(raw) => raw.trim().parse().map(Some).map_err(|e| {
            ConfigError::Parse(format!("Invalid {}{}: {}", ENV_PREFIX, name, e))
        }),
        None => Ok(None),
    }
}

/// Expand environment variables in a string
///
/// Supports `${VAR_NAME}` syntax
fn expand_env_vars(input: &str) -> String {
    let re = regex_lite::Regex::new(r"\$\{([^}]+)\}")
        .expect("Invalid regex pattern for environment variable expansion");

    re.replace_all(input, |caps: &regex_lite::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.jwt.secret = SECRET.to_string();
        config
    }

    // Test 1: Parse complete configuration from YAML
    #[test]
    fn test_parse_complete_yaml_config() {
        let yaml = r#"
jwt:
  secret: "0123456789abcdef0123456789abcdef"
  access_ttl_secs: 600
  refresh_ttl_secs: 86400

session:
  client_cache_ttl_secs: 120
  user_cache_ttl_secs: 30
  operation_timeout_ms: 750

cache:
  backend: redis
  redis:
    url: "redis://cache:6379/2"
    namespace: "sk-test"

rate_limit:
  capacity: 50
  refill_per_sec: 2.5
  idle_timeout_secs: 900
  sweep_interval_secs: 60

logging:
  level: "debug"
  format: "pretty"
"#;

        let config = Config::from_yaml(yaml).unwrap();

        assert_eq!(config.jwt.secret, SECRET);
        assert_eq!(config.jwt.access_ttl_secs, 600);
        assert_eq!(config.jwt.refresh_ttl_secs, 86400);

        assert_eq!(config.session.client_cache_ttl_secs, 120);
        assert_eq!(config.session.user_cache_ttl_secs, 30);
        assert_eq!(config.session.operation_timeout_ms, 750);

        assert_eq!(config.cache.backend, CacheBackend::Redis);
        let redis = config.cache.redis.as_ref().unwrap();
        assert_eq!(redis.url, "redis://cache:6379/2");
        assert_eq!(redis.namespace, "sk-test");

        assert_eq!(config.rate_limit.capacity, 50.0);
        assert_eq!(config.rate_limit.refill_per_sec, 2.5);
        assert_eq!(config.rate_limit.idle_timeout_secs, 900);
        assert_eq!(config.rate_limit.sweep_interval_secs, 60);

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");

        assert!(config.validate().is_ok());
    }

    // Test 2: Default values are applied for missing fields
    #[test]
    fn test_default_values_applied() {
        let yaml = r#"
jwt:
  access_ttl_secs: 60
"#;

        let config = Config::from_yaml(yaml).unwrap();

        // JWT defaults
        assert_eq!(config.jwt.secret, "");
        assert_eq!(config.jwt.access_ttl_secs, 60); // specified value
        assert_eq!(config.jwt.refresh_ttl_secs, 604_800);

        // Session defaults
        assert_eq!(config.session.client_cache_ttl_secs, 3600);
        assert_eq!(config.session.user_cache_ttl_secs, 300);
        assert_eq!(config.session.operation_timeout_ms, 2000);

        // Cache defaults
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert!(config.cache.redis.is_none());

        // Rate limit defaults
        assert_eq!(config.rate_limit.capacity, 20.0);
        assert_eq!(config.rate_limit.refill_per_sec, 5.0);

        // Logging defaults
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");
    }

    // Test 3: Environment variable expansion
    #[test]
    fn test_env_var_expansion() {
        std::env::set_var("TEST_SK_JWT_SECRET", SECRET);
        std::env::set_var("TEST_SK_REDIS_URL", "redis://env:6379");

        let yaml = r#"
jwt:
  secret: "${TEST_SK_JWT_SECRET}"
cache:
  redis:
    url: "${TEST_SK_REDIS_URL}"
"#;

        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.jwt.secret, SECRET);
        assert_eq!(config.cache.redis.unwrap().url, "redis://env:6379");

        // Clean up
        std::env::remove_var("TEST_SK_JWT_SECRET");
        std::env::remove_var("TEST_SK_REDIS_URL");
    }

    // Test 4: Unset variables are left in place
    #[test]
    fn test_env_var_expansion_unset() {
        let expanded = expand_env_vars("secret: ${TEST_SK_DEFINITELY_UNSET}");
        assert_eq!(expanded, "secret: ${TEST_SK_DEFINITELY_UNSET}");
    }

    // Test 5: from_env loads config from environment variables
    #[test]
    fn test_from_env() {
        std::env::set_var("SESSION_KERNEL_JWT_SECRET", SECRET);
        std::env::set_var("SESSION_KERNEL_JWT_ACCESS_TTL_SECS", "120");
        std::env::set_var("SESSION_KERNEL_CACHE_BACKEND", "redis");
        std::env::set_var("SESSION_KERNEL_CACHE_REDIS_URL", "redis://env:6379");
        std::env::set_var("SESSION_KERNEL_RATE_LIMIT_CAPACITY", "7");
        std::env::set_var("SESSION_KERNEL_RATE_LIMIT_IDLE_TIMEOUT_SECS", "600");
        std::env::set_var("SESSION_KERNEL_RATE_LIMIT_SWEEP_INTERVAL_SECS", "15");
        std::env::set_var("SESSION_KERNEL_LOG_LEVEL", "warn");

        let config = Config::from_env().unwrap();

        assert_eq!(config.jwt.secret, SECRET);
        assert_eq!(config.jwt.access_ttl_secs, 120);
        assert_eq!(config.cache.backend, CacheBackend::Redis);
        let redis = config.cache.redis.as_ref().unwrap();
        assert_eq!(redis.url, "redis://env:6379");
        assert_eq!(redis.namespace, "session-kernel");
        assert_eq!(config.rate_limit.capacity, 7.0);
        assert_eq!(config.rate_limit.idle_timeout_secs, 600);
        assert_eq!(config.rate_limit.sweep_interval_secs, 15);
        assert_eq!(config.logging.level, "warn");
        assert!(config.validate().is_ok());

        // Clean up
        std::env::remove_var("SESSION_KERNEL_JWT_SECRET");
        std::env::remove_var("SESSION_KERNEL_JWT_ACCESS_TTL_SECS");
        std::env::remove_var("SESSION_KERNEL_CACHE_BACKEND");
        std::env::remove_var("SESSION_KERNEL_CACHE_REDIS_URL");
        std::env::remove_var("SESSION_KERNEL_RATE_LIMIT_CAPACITY");
        std::env::remove_var("SESSION_KERNEL_RATE_LIMIT_IDLE_TIMEOUT_SECS");
        std::env::remove_var("SESSION_KERNEL_RATE_LIMIT_SWEEP_INTERVAL_SECS");
        std::env::remove_var("SESSION_KERNEL_LOG_LEVEL");
    }

    // Test 6: Parse error for invalid YAML
    #[test]
    fn test_parse_error_invalid_yaml() {
        let yaml = r#"
jwt:
  access_ttl_secs: "not_a_number"
"#;

        match Config::from_yaml(yaml) {
            Err(ConfigError::Parse(msg)) => {
                assert!(msg.contains("Failed to parse YAML"));
            }
            other => panic!("Expected ConfigError::Parse, got {:?}", other),
        }
    }

    // Test 7: Unknown cache backend is a parse error
    #[test]
    fn test_unknown_cache_backend() {
        let yaml = r#"
cache:
  backend: memcached
"#;
        assert!(matches!(
            Config::from_yaml(yaml),
            Err(ConfigError::Parse(_))
        ));
        assert!("memcached".parse::<CacheBackend>().is_err());
        assert_eq!("Redis".parse::<CacheBackend>(), Ok(CacheBackend::Redis));
    }

    // Test 8: Validation of the signing secret
    #[test]
    fn test_validate_secret() {
        assert!(matches!(
            Config::default().validate(),
            Err(ConfigError::MissingRequired(_))
        ));

        let mut config = valid_config();
        config.jwt.secret = "too-short".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_))
        ));

        assert!(valid_config().validate().is_ok());
    }

    // Test 9: Validation of numeric settings
    #[test]
    fn test_validate_numbers() {
        let mut config = valid_config();
        config.jwt.access_ttl_secs = 0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.session.operation_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.rate_limit.capacity = 0.5;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.rate_limit.refill_per_sec = 0.0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.rate_limit.refill_per_sec = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.rate_limit.sweep_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    // Test 10: Redis backend requires a redis section
    #[test]
    fn test_validate_redis_section() {
        let mut config = valid_config();
        config.cache.backend = CacheBackend::Redis;
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingRequired("cache.redis".to_string()))
        );

        config.cache.redis = Some(RedisConfig::default());
        assert!(config.validate().is_ok());
    }

    // Test 11: Conversions into runtime structs
    #[test]
    fn test_runtime_conversions() {
        let config = valid_config();

        let tokens = config.token_config();
        assert_eq!(tokens.secret, SECRET);
        assert_eq!(tokens.access_ttl, Duration::from_secs(900));
        assert_eq!(tokens.refresh_ttl, Duration::from_secs(604_800));

        let session = config.session_config();
        assert_eq!(session.tokens, tokens);
        assert_eq!(session.client_cache_ttl, Duration::from_secs(3600));
        assert_eq!(session.user_cache_ttl, Duration::from_secs(300));
        assert_eq!(session.operation_timeout, Duration::from_millis(2000));

        let limits = config.rate_limit_config();
        assert_eq!(limits, RateLimitConfig::default());
    }

    // Test 12: Debug output never shows the secret
    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", valid_config());
        assert!(!debug.contains(SECRET));
        assert!(debug.contains("<redacted>"));
    }

    // Test 13: Config serialization round-trip
    #[test]
    fn test_config_serialization_roundtrip() {
        let config = valid_config();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    // Test 14: Empty YAML results in defaults
    #[test]
    fn test_empty_yaml_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    // Test 15: Load from file
    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "jwt:\n  secret: \"0123456789abcdef0123456789abcdef\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.jwt.secret, SECRET);

        assert!(matches!(
            Config::from_file(dir.path().join("missing.yaml")),
            Err(ConfigError::FileRead(_))
        ));
    }
}
