//! Application state for the order-management CLI.
//!
//! Owns the single `ApiClient` for the process. The bearer token is restored
//! from durable storage when the state is built.

use std::sync::Arc;

use crate::api::auth::TokenStore;
use crate::api::client::ApiClient;
use crate::api::error::ClientError;
use crate::config::ClientConfig;

pub struct AppState {
    /// HTTP client for the backend API.
    pub api: Arc<ApiClient>,
}

impl AppState {
    /// Build the API client and apply any stored bearer token.
    ///
    /// A token store that cannot be read is logged and treated as empty, so
    /// commands that do not need a login still work.
    pub async fn bootstrap(
        config: &ClientConfig,
        token_store: Arc<dyn TokenStore>,
    ) -> Result<Self, ClientError> {
        let api = ApiClient::new(config, token_store)?;
        log::debug!("API client ready for {}", api.base_url());

        match api.restore_bearer_token().await {
            Ok(true) => log::debug!("Restored stored bearer token"),
            Ok(false) => log::debug!("No stored bearer token"),
            Err(e) => log::warn!("Could not read stored bearer token: {}", e),
        }

        Ok(Self { api: Arc::new(api) })
    }
}
