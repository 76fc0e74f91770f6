//! Screen-level commands.
//!
//! Each command performs its API calls and returns the text to print. Errors
//! come back as `ClientError`; `main` logs them and shows `user_message()`.
//! Form validation happens here, before any request is sent.

use std::fmt::Write;

use bigdecimal::BigDecimal;

use crate::api::error::ClientError;
use crate::api::types::{
    parse_amount, Client, ClientInput, Order, OrderItemInput, OrderLine, OrderPayload, Product,
    ProductInput,
};
use crate::api::{clients, orders, products, session};
use crate::state::AppState;
use crate::totals;

/// Who a new order belongs to.
#[derive(Debug, Clone)]
pub enum OrderClient {
    Existing(u64),
    New(ClientInput),
}

fn invalid(msg: &str) -> ClientError {
    ClientError::InvalidInput(msg.to_string())
}

pub async fn login(state: &AppState, email: &str, password: &str) -> Result<String, ClientError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(invalid("Email and password are required."));
    }
    session::login(&state.api, email.trim(), password).await?;
    Ok(format!("Logged in as {}", email.trim()))
}

pub async fn logout(state: &AppState) -> Result<String, ClientError> {
    if !state.api.has_bearer_token().await {
        return Ok("Not logged in.".to_string());
    }
    session::logout(&state.api).await?;
    Ok("Logged out".to_string())
}

pub async fn list_clients(state: &AppState) -> Result<String, ClientError> {
    let clients = clients::list(&state.api).await?;
    if clients.is_empty() {
        return Ok("No clients found.".to_string());
    }
    Ok(clients.iter().map(render_client).collect::<Vec<_>>().join("\n"))
}

pub async fn create_client(state: &AppState, name: &str, email: &str) -> Result<String, ClientError> {
    let input = client_input(name, email)?;
    let client = clients::create(&state.api, &input).await?;
    Ok(format!("Created {}", render_client(&client)))
}

fn client_input(name: &str, email: &str) -> Result<ClientInput, ClientError> {
    let (name, email) = (name.trim(), email.trim());
    if name.is_empty() || email.is_empty() {
        return Err(invalid("Client name and email are required."));
    }
    if !email.contains('@') {
        return Err(invalid("Client email is invalid."));
    }
    Ok(ClientInput {
        name: name.to_string(),
        email: email.to_string(),
    })
}

pub async fn list_products(state: &AppState) -> Result<String, ClientError> {
    let products = products::list(&state.api).await?;
    if products.is_empty() {
        return Ok("No products found.".to_string());
    }
    Ok(products.iter().map(render_product).collect::<Vec<_>>().join("\n"))
}

pub async fn create_product(state: &AppState, name: &str, price: &str) -> Result<String, ClientError> {
    if name.trim().is_empty() || price.trim().is_empty() {
        return Err(invalid("Name and price are required."));
    }
    let price = parse_amount(price).map_err(|_| invalid("Invalid price."))?;
    if price < BigDecimal::from(0) {
        return Err(invalid("Invalid price."));
    }

    let input = ProductInput {
        name: name.trim().to_string(),
        price,
    };
    let product = products::create(&state.api, &input).await?;
    Ok(format!("Created {}", render_product(&product)))
}

pub async fn list_orders(state: &AppState) -> Result<String, ClientError> {
    let orders = orders::list(&state.api).await?;
    if orders.is_empty() {
        return Ok("No orders found.".to_string());
    }
    Ok(orders.iter().map(render_order_summary).collect::<Vec<_>>().join("\n"))
}

pub async fn show_order(state: &AppState, id: u64) -> Result<String, ClientError> {
    let order = orders::get(&state.api, id).await?;
    Ok(render_order(&order))
}

pub async fn create_order(
    state: &AppState,
    client: OrderClient,
    lines: Vec<OrderLine>,
) -> Result<String, ClientError> {
    if lines.is_empty() {
        return Err(invalid("An order needs at least one item."));
    }

    let payload = match client {
        OrderClient::Existing(client_id) => {
            let catalog = orders::load_catalog(&state.api).await?;
            check_client(client_id, &catalog.clients)?;
            let items = price_lines(lines, &catalog.products)?;
            OrderPayload::Existing { client_id, items }
        }
        OrderClient::New(input) => {
            let input = client_input(&input.name, &input.email)?;
            let products = products::list(&state.api).await?;
            let items = price_lines(lines, &products)?;
            OrderPayload::NewClient { client: input, items }
        }
    };
    validate_items(payload.items())?;

    let total = totals::items_total(payload.items());
    let order = orders::create(&state.api, &payload).await?;
    Ok(format!("Created order #{} (total {})", order.id, total))
}

/// Load the order for editing, apply the changes and save it.
///
/// Unspecified fields keep their current values.
pub async fn edit_order(
    state: &AppState,
    id: u64,
    client_id: Option<u64>,
    lines: Option<Vec<OrderLine>>,
) -> Result<String, ClientError> {
    if lines.as_ref().is_some_and(Vec::is_empty) {
        return Err(invalid("An order needs at least one item."));
    }

    let form = orders::load_edit_form(&state.api, id).await?;
    let client_id = client_id.unwrap_or(form.client_id);
    let items = match lines {
        Some(lines) => price_lines(lines, &form.catalog.products)?,
        None => form.items,
    };
    validate_items(&items)?;
    check_client(client_id, &form.catalog.clients)?;

    let total = totals::items_total(&items);
    let payload = OrderPayload::Existing { client_id, items };
    let order = orders::update(&state.api, id, &payload).await?;
    Ok(format!("Updated order #{} (total {})", order.id, total))
}

pub async fn delete_order(state: &AppState, id: u64) -> Result<String, ClientError> {
    orders::delete(&state.api, id).await?;
    Ok(format!("Deleted order #{}", id))
}

fn validate_items(items: &[OrderItemInput]) -> Result<(), ClientError> {
    if items.is_empty() {
        return Err(invalid("An order needs at least one item."));
    }
    if items.iter().any(|i| i.quantity < 1) {
        return Err(invalid("Item quantity must be at least 1."));
    }
    if items.iter().any(|i| i.unit_price < BigDecimal::from(0)) {
        return Err(invalid("Unit price cannot be negative."));
    }
    Ok(())
}

fn check_client(client_id: u64, clients: &[Client]) -> Result<(), ClientError> {
    if !clients.iter().any(|c| c.id == client_id) {
        return Err(ClientError::InvalidInput(format!("Unknown client #{}.", client_id)));
    }
    Ok(())
}

/// Match each line to a catalog product, filling in its price where none was given.
fn price_lines(
    lines: Vec<OrderLine>,
    products: &[Product],
) -> Result<Vec<OrderItemInput>, ClientError> {
    lines
        .into_iter()
        .map(|line| match products.iter().find(|p| p.id == line.product_id) {
            Some(product) => Ok(line.priced(&product.price)),
            None => Err(ClientError::InvalidInput(format!(
                "Unknown product #{}.",
                line.product_id
            ))),
        })
        .collect()
}

fn render_client(client: &Client) -> String {
    format!("#{} {} <{}>", client.id, client.name, client.email)
}

fn render_product(product: &Product) -> String {
    format!("#{} {} ({})", product.id, product.name, money(&product.price))
}

fn render_order_summary(order: &Order) -> String {
    format!(
        "#{} {} - {} item(s) - Total: {}",
        order.id,
        order.client.name,
        order.products.len(),
        order.display_total()
    )
}

fn render_order(order: &Order) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Order #{}", order.id);
    let _ = writeln!(out, "Client: {}", render_client(&order.client));
    for line in &order.products {
        let _ = writeln!(
            out,
            "  {} x{} @ {} = {}",
            line.product.name,
            line.pivot.quantity,
            money(&line.pivot.unit_price),
            money(&totals::line_total(line.pivot.quantity, &line.pivot.unit_price))
        );
    }
    let _ = write!(out, "Total: {}", order.display_total());
    out
}

fn money(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(totals::CURRENCY_SCALE, bigdecimal::RoundingMode::HalfUp)
}
