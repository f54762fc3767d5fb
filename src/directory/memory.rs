//! In-memory user directory
//!
//! Holds users and clients in maps behind an async `RwLock`. Used by the CLI and
//! integration tests; production deployments plug in their own [`UserDirectory`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::DirectoryError;
use crate::models::{Client, User};

use super::UserDirectory;

#[derive(Default)]
struct DirectoryState {
    /// Users by ID
    users: HashMap<String, User>,
    /// Lowercased email to user ID
    emails: HashMap<String, String>,
    /// Clients by secret
    clients: HashMap<String, Client>,
}

/// In-memory [`UserDirectory`]
#[derive(Default)]
pub struct MemoryDirectory {
    state: RwLock<DirectoryState>,
    lookups: AtomicU64,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user
    pub async fn insert_user(&self, user: User) {
        let mut state = self.state.write().await;
        if let Some(previous) = state.users.get(&user.id) {
            let old_email = previous.email.to_lowercase();
            state.emails.remove(&old_email);
        }
        state
            .emails
            .insert(user.email.to_lowercase(), user.id.clone());
        state.users.insert(user.id.clone(), user);
    }

    /// Insert or replace a client
    pub async fn insert_client(&self, client: Client) {
        let mut state = self.state.write().await;
        state.clients.insert(client.client_secret.clone(), client);
    }

    /// Number of lookups served so far
    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }

    fn record_lookup(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        self.record_lookup();
        let state = self.state.read().await;
        Ok(state
            .emails
            .get(&email.trim().to_lowercase())
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn find_with_roles(&self, id: &str) -> Result<Option<User>, DirectoryError> {
        self.record_lookup();
        let state = self.state.read().await;
        Ok(state.users.get(id).cloned())
    }

    async fn find_client_by_secret(&self, secret: &str) -> Result<Option<Client>, DirectoryError> {
        self.record_lookup();
        let state = self.state.read().await;
        Ok(state.clients.get(secret).cloned())
    }

    async fn soft_delete_client(
        &self,
        secret: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, DirectoryError> {
        let mut state = self.state.write().await;
        match state.clients.get_mut(secret) {
            Some(client) => {
                client.deleted_at = Some(at);
                client.updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
