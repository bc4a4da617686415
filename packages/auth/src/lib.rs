// ABOUTME: Ascent authentication collaborator interface
// ABOUTME: Trait-based seam over the remote auth backend plus an in-memory provider for tests and offline use

pub mod error;

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;

pub use error::{AuthError, AuthResult};

/// The opaque identity delivered by the authentication backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub photo_url: Option<String>,
}

/// The authentication backend seam. The real backend lives outside this
/// system; everything here consumes it through this trait.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthUser>;

    async fn sign_up(&self, email: &str, password: &str, display_name: &str)
        -> AuthResult<AuthUser>;

    /// Sign in through a federated identity provider
    async fn sign_in_federated(&self) -> AuthResult<AuthUser>;

    async fn sign_out(&self) -> AuthResult<()>;

    fn current_user(&self) -> Option<AuthUser>;

    /// Auth-state change stream; receivers observe `Some(user)` on sign-in
    /// and `None` on sign-out
    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>>;
}

/// In-memory auth provider used in tests and offline development
pub struct MemoryAuth {
    accounts: Mutex<HashMap<String, (String, AuthUser)>>,
    state_tx: watch::Sender<Option<AuthUser>>,
    next_uid: Mutex<u64>,
}

impl MemoryAuth {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(None);
        Self {
            accounts: Mutex::new(HashMap::new()),
            state_tx,
            next_uid: Mutex::new(1),
        }
    }

    fn mint_uid(&self) -> String {
        let mut next = self.next_uid.lock().unwrap();
        let uid = format!("user-{}", *next);
        *next += 1;
        uid
    }
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthUser> {
        let accounts = self.accounts.lock().unwrap();
        let (stored_password, user) = accounts
            .get(email)
            .ok_or_else(|| AuthError::UserNotFound(email.to_string()))?;
        if stored_password != password {
            return Err(AuthError::InvalidCredentials);
        }
        let user = user.clone();
        drop(accounts);

        info!("Signed in {}", user.uid);
        let _ = self.state_tx.send(Some(user.clone()));
        Ok(user)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> AuthResult<AuthUser> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(AuthError::EmailInUse(email.to_string()));
        }
        let user = AuthUser {
            uid: self.mint_uid(),
            email: email.to_string(),
            display_name: display_name.to_string(),
            photo_url: None,
        };
        accounts.insert(email.to_string(), (password.to_string(), user.clone()));
        drop(accounts);

        info!("Signed up {}", user.uid);
        let _ = self.state_tx.send(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in_federated(&self) -> AuthResult<AuthUser> {
        // No federated identity exists in-memory; surface it as a provider error
        Err(AuthError::Provider(
            "federated sign-in is not available offline".to_string(),
        ))
    }

    async fn sign_out(&self) -> AuthResult<()> {
        let _ = self.state_tx.send(None);
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.state_tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.state_tx.subscribe()
    }
}
