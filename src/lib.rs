//! session-kernel - bearer credential issuance, validation and revocation
//!
//! This crate provides the session core beneath an API: access/refresh token pairs backed
//! by a presence-marker session cache, password credentials, role checks, and a per-key
//! token bucket rate limiter for request admission.

pub mod auth;
pub mod cache;
pub mod clock;
pub mod config;
pub mod directory;
pub mod error;
pub mod models;
pub mod telemetry;
