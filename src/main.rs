//! session-kernel - operator tooling for the session core
//!
//! Hashes passwords for provisioning, mints and inspects tokens with the configured
//! secret, and validates configuration files.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{debug, info};

use session_kernel::auth::{hash_password, issue_pair, validate};
use session_kernel::cache;
use session_kernel::clock::SystemClock;
use session_kernel::config::{Config, LoggingConfig};
use session_kernel::models::ClientType;
use session_kernel::telemetry::init_tracing;

/// session-kernel - bearer credential issuance, validation and revocation
#[derive(Parser, Debug)]
#[command(name = "session-kernel")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "SESSION_KERNEL_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a PHC-format hash for provisioning a password credential
    HashPassword {
        /// Plaintext password (at least 8 characters)
        plaintext: String,
    },

    /// Mint a token pair with the configured secret and print it as JSON
    Issue {
        /// User ID to issue for
        #[arg(long)]
        user: String,

        /// Client type (WEB, IOS, ANDROID, ...)
        #[arg(long, default_value = "WEB")]
        client: String,
    },

    /// Validate a token and print its claims
    Inspect {
        /// Raw signed token
        token: String,
    },

    /// Load, validate and summarise configuration
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    match args.command {
        Command::HashPassword { ref plaintext } => {
            init_tracing(&LoggingConfig::default())?;
            let hash = hash_password(plaintext)?;
            println!("{}", hash.as_str());
        }
        Command::Issue {
            ref user,
            ref client,
        } => {
            let config = load_config(&args)?;
            let pair = issue_pair(
                user,
                &ClientType::new(client.as_str()),
                &config.token_config(),
                &SystemClock,
            )?;
            info!(user_id = %user, client_type = %client, "Issued token pair");
            println!("{}", serde_json::to_string_pretty(&pair)?);
        }
        Command::Inspect { ref token } => {
            let config = load_config(&args)?;
            match validate(token, &config.jwt.secret, &SystemClock) {
                Ok(claims) => {
                    let expires_at = claims.expires_at();
                    let report = json!({
                        "valid": true,
                        "claims": claims,
                        "expires_at": expires_at,
                    });
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                Err(e) => {
                    let reason = e
                        .unauthorized_reason()
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| e.to_string());
                    let report = json!({
                        "valid": false,
                        "reason": reason,
                        "expired": e.is_expired(),
                    });
                    println!("{}", serde_json::to_string_pretty(&report)?);
                    anyhow::bail!("token rejected: {}", reason);
                }
            }
        }
        Command::CheckConfig => {
            let config = load_config(&args)?;
            let cache = cache::from_config(&config.cache, Arc::new(SystemClock))
                .await
                .context("Failed to initialize session cache")?;
            info!(backend = cache.name(), "Session cache reachable");
            println!("{:#?}", config);
            println!("configuration is valid");
        }
    }

    Ok(())
}

/// Load, validate and apply logging configuration
fn load_config(args: &Args) -> anyhow::Result<Config> {
    let config = match &args.config {
        Some(path) => {
            // Use eprintln! since tracing is not yet initialized
            eprintln!("Loading configuration from file: {}", path);
            Config::from_file(path).context("Failed to load config")?
        }
        None => {
            // Use eprintln! since tracing is not yet initialized
            eprintln!("Loading configuration from environment variables");
            Config::from_env().context("Failed to load config")?
        }
    };

    config.validate().context("Invalid configuration")?;
    init_tracing(&config.logging)?;
    debug!(backend = ?config.cache.backend, "Configuration loaded");

    Ok(config)
}
