//! Order endpoints and the combined loads the order forms need.
//!
//! Independent reads run concurrently under `tokio::try_join!`: the first
//! failure fails the whole load and nothing partial is handed back.

use super::client::ApiClient;
use super::error::ClientError;
use super::types::{Client, Order, OrderItemInput, OrderPayload, Product};
use super::{clients, products};

/// Everything the create-order form needs to render.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub clients: Vec<Client>,
    pub products: Vec<Product>,
}

/// Everything the edit-order form needs to render.
#[derive(Debug, Clone)]
pub struct EditForm {
    pub client_id: u64,
    pub items: Vec<OrderItemInput>,
    pub catalog: Catalog,
}

fn order_path(id: u64) -> String {
    format!("/orders/{}", id)
}

/// GET /orders
pub async fn list(api: &ApiClient) -> Result<Vec<Order>, ClientError> {
    api.get_json("/orders").await
}

/// GET /orders/{id}
pub async fn get(api: &ApiClient, id: u64) -> Result<Order, ClientError> {
    api.get_json(&order_path(id)).await
}

/// POST /orders
pub async fn create(api: &ApiClient, payload: &OrderPayload) -> Result<Order, ClientError> {
    let order: Order = api.post_json("/orders", payload).await?;
    log::info!("Created order {} with {} items", order.id, payload.items().len());
    Ok(order)
}

/// PUT /orders/{id}
pub async fn update(
    api: &ApiClient,
    id: u64,
    payload: &OrderPayload,
) -> Result<Order, ClientError> {
    let order: Order = api.put_json(&order_path(id), payload).await?;
    log::info!("Updated order {}", id);
    Ok(order)
}

/// DELETE /orders/{id}
pub async fn delete(api: &ApiClient, id: u64) -> Result<(), ClientError> {
    api.delete(&order_path(id)).await?;
    log::info!("Deleted order {}", id);
    Ok(())
}

/// Fetch clients and products together.
pub async fn load_catalog(api: &ApiClient) -> Result<Catalog, ClientError> {
    let (clients, products) = tokio::try_join!(clients::list(api), products::list(api))?;
    Ok(Catalog { clients, products })
}

/// Fetch an order plus the clients and products needed to edit it.
pub async fn load_edit_form(api: &ApiClient, id: u64) -> Result<EditForm, ClientError> {
    let (order, clients, products) =
        tokio::try_join!(get(api, id), clients::list(api), products::list(api))?;

    Ok(EditForm {
        client_id: order.client.id,
        items: order.items(),
        catalog: Catalog { clients, products },
    })
}
