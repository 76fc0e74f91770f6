//! Durable bearer-token storage.
//!
//! The login token survives restarts by living in the system keychain
//! (via the `keyring` crate). A single fixed key holds the token string.

use std::sync::Mutex;

use keyring::Entry;
use thiserror::Error;

/// Keychain service name for this application.
pub const SERVICE_NAME: &str = "com.orderdesk.cli";

/// Keychain account holding the bearer token.
const AUTH_TOKEN_KEY: &str = "auth_token";

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("Keychain operation failed: {0}")]
    OperationFailed(String),
}

impl From<keyring::Error> for TokenStoreError {
    fn from(err: keyring::Error) -> Self {
        TokenStoreError::OperationFailed(err.to_string())
    }
}

/// Durable storage for the bearer token.
///
/// `ApiClient` writes through this on login/logout and reads it once at startup.
pub trait TokenStore: Send + Sync {
    /// Returns `None` if no token has been stored.
    fn load(&self) -> Result<Option<String>, TokenStoreError>;

    fn save(&self, token: &str) -> Result<(), TokenStoreError>;

    /// Idempotent: deleting a missing token is not an error.
    fn delete(&self) -> Result<(), TokenStoreError>;
}

/// Keychain-backed token store.
pub struct KeychainTokenStore {
    service: String,
}

impl KeychainTokenStore {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry, TokenStoreError> {
        Ok(Entry::new(&self.service, AUTH_TOKEN_KEY)?)
    }
}

impl Default for KeychainTokenStore {
    fn default() -> Self {
        Self::new(SERVICE_NAME)
    }
}

impl TokenStore for KeychainTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(TokenStoreError::from(e)),
        }
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        self.entry()?.set_password(token)?;
        Ok(())
    }

    fn delete(&self) -> Result<(), TokenStoreError> {
        match self.entry()?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()), // Already deleted, idempotent
            Err(e) => Err(TokenStoreError::from(e)),
        }
    }
}

/// In-process token store. Nothing outlives the process.
///
/// Used by tests and by `--ephemeral` runs.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    #[cfg(test)]
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, TokenStoreError> {
        self.token
            .lock()
            .map_err(|_| TokenStoreError::OperationFailed("token store lock poisoned".into()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        *self.lock()? = Some(token.to_string());
        Ok(())
    }

    fn delete(&self) -> Result<(), TokenStoreError> {
        *self.lock()? = None;
        Ok(())
    }
}
