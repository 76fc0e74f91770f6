//! Request and response types for the order-management backend API.
//!
//! Field names match the API's snake_case JSON. Decimal amounts accept either
//! JSON numbers or decimal strings, since the backend emits both, and are sent
//! back as JSON numbers.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Login request body sent to POST /login.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response from POST /login. A missing token is a failed login.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: u64,
    pub name: String,
    pub email: String,
}

/// Body for POST /clients, also embedded in an order created with a new client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInput {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(default, with = "amount")]
    pub price: BigDecimal,
}

/// Body for POST /products.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(with = "amount")]
    pub price: BigDecimal,
}

/// Per-order attributes of a product line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    pub quantity: u32,
    #[serde(with = "amount")]
    pub unit_price: BigDecimal,
}

/// A product as embedded in an order, with its line attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderProduct {
    #[serde(flatten)]
    pub product: Product,
    pub pivot: Pivot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub client: Client,
    /// Server-computed total; absent on some endpoints.
    #[serde(default, with = "amount::option")]
    pub total: Option<BigDecimal>,
    #[serde(default)]
    pub products: Vec<OrderProduct>,
}

/// One order line as submitted by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub product_id: u64,
    pub quantity: u32,
    #[serde(with = "amount")]
    pub unit_price: BigDecimal,
}

impl OrderItemInput {
    pub fn new(product_id: u64, quantity: u32, unit_price: BigDecimal) -> Self {
        Self {
            product_id,
            quantity,
            unit_price,
        }
    }
}

/// One order line as typed on the command line: `PRODUCT_ID:QUANTITY[:UNIT_PRICE]`.
///
/// Without a price the line takes the product's catalog price.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub product_id: u64,
    pub quantity: u32,
    pub unit_price: Option<BigDecimal>,
}

impl OrderLine {
    /// Complete the line, taking the unit price from `catalog_price` when none was given.
    pub fn priced(self, catalog_price: &BigDecimal) -> OrderItemInput {
        let unit_price = self.unit_price.unwrap_or_else(|| catalog_price.clone());
        OrderItemInput::new(self.product_id, self.quantity, unit_price)
    }
}

impl FromStr for OrderLine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':').map(str::trim);
        let (Some(id), Some(qty), price, None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(format!(
                "expected PRODUCT_ID:QUANTITY[:UNIT_PRICE], got {:?}",
                s
            ));
        };

        let product_id = id
            .parse::<u64>()
            .map_err(|_| format!("invalid product id {:?}", id))?;
        let quantity = qty
            .parse::<u32>()
            .map_err(|_| format!("invalid quantity {:?}", qty))?;
        let unit_price = price.map(parse_amount).transpose()?;

        Ok(Self {
            product_id,
            quantity,
            unit_price,
        })
    }
}

/// Parse a user-entered amount, accepting a comma as decimal separator.
pub fn parse_amount(raw: &str) -> Result<BigDecimal, String> {
    let normalized = raw.trim().replace(',', ".");
    BigDecimal::from_str(&normalized).map_err(|_| format!("invalid amount {:?}", raw))
}

/// Body for POST /orders and PUT /orders/{id}.
///
/// The order either references an existing client or creates one inline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OrderPayload {
    Existing {
        client_id: u64,
        items: Vec<OrderItemInput>,
    },
    NewClient {
        client: ClientInput,
        items: Vec<OrderItemInput>,
    },
}

impl OrderPayload {
    pub fn items(&self) -> &[OrderItemInput] {
        match self {
            OrderPayload::Existing { items, .. } | OrderPayload::NewClient { items, .. } => items,
        }
    }
}

/// Decimal amounts on the wire.
///
/// Numbers are read through their JSON text (`19.99` stays `19.99` rather than
/// the nearest binary double) and written back as JSON numbers.
mod amount {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(serde_json::Number),
        Text(String),
    }

    fn parse<E: serde::de::Error>(raw: Raw) -> Result<BigDecimal, E> {
        let text = match raw {
            Raw::Number(n) => n.to_string(),
            Raw::Text(s) => s,
        };
        BigDecimal::from_str(text.trim()).map_err(E::custom)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BigDecimal, D::Error> {
        parse(Raw::deserialize(d)?)
    }

    pub fn serialize<S: Serializer>(value: &BigDecimal, s: S) -> Result<S::Ok, S::Error> {
        serde_json::Number::from_str(&value.to_string())
            .map_err(serde::ser::Error::custom)?
            .serialize(s)
    }

    pub mod option {
        use super::*;

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<BigDecimal>, D::Error> {
            Option::<Raw>::deserialize(d)?.map(parse).transpose()
        }

        pub fn serialize<S: Serializer>(value: &Option<BigDecimal>, s: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, s),
                None => s.serialize_none(),
            }
        }
    }
}
