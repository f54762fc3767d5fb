//! Domain models for session-kernel
//!
//! This module contains the core domain models used throughout the crate.

pub mod client;
pub mod token;
pub mod user;

// Re-export commonly used types
pub use client::{Client, ClientType};
pub use token::{Token, TokenKind, TokenPair};
pub use user::{Credential, CredentialKind, RoleAssignment, RoleName, User};
