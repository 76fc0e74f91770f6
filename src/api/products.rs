//! Product catalog endpoints.

use super::client::ApiClient;
use super::error::ClientError;
use super::types::{Product, ProductInput};

/// GET /products
pub async fn list(api: &ApiClient) -> Result<Vec<Product>, ClientError> {
    api.get_json("/products").await
}

/// POST /products
pub async fn create(api: &ApiClient, input: &ProductInput) -> Result<Product, ClientError> {
    let product: Product = api.post_json("/products", input).await?;
    log::info!("Created product {} ({})", product.id, product.name);
    Ok(product)
}
