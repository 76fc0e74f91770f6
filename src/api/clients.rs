//! Client (customer) endpoints.

use super::client::ApiClient;
use super::error::ClientError;
use super::types::{Client, ClientInput};

/// GET /clients
pub async fn list(api: &ApiClient) -> Result<Vec<Client>, ClientError> {
    api.get_json("/clients").await
}

/// POST /clients
pub async fn create(api: &ApiClient, input: &ClientInput) -> Result<Client, ClientError> {
    let client: Client = api.post_json("/clients", input).await?;
    log::info!("Created client {} ({})", client.id, client.email);
    Ok(client)
}
