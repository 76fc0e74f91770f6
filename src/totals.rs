//! Client-side order total computation.
//!
//! Totals are `sum(quantity * unit_price)` rounded half-up to cents. The
//! server total is preferred when present; the recomputed one fills in when
//! the backend omits it.

use bigdecimal::{BigDecimal, RoundingMode};

use crate::api::types::{Order, OrderItemInput};

/// Number of decimal places totals are displayed with.
pub const CURRENCY_SCALE: i64 = 2;

pub fn line_total(quantity: u32, unit_price: &BigDecimal) -> BigDecimal {
    BigDecimal::from(quantity) * unit_price
}

fn round(amount: BigDecimal) -> BigDecimal {
    amount.with_scale_round(CURRENCY_SCALE, RoundingMode::HalfUp)
}

/// Total of a list of order lines, rounded to cents.
pub fn items_total(items: &[OrderItemInput]) -> BigDecimal {
    let sum = items
        .iter()
        .map(|item| line_total(item.quantity, &item.unit_price))
        .fold(BigDecimal::from(0), |acc, line| acc + line);
    round(sum)
}

impl Order {
    /// Convert the embedded products into editable order lines.
    pub fn items(&self) -> Vec<OrderItemInput> {
        self.products
            .iter()
            .map(|p| OrderItemInput::new(p.product.id, p.pivot.quantity, p.pivot.unit_price.clone()))
            .collect()
    }

    /// Total recomputed from the pivot lines.
    pub fn computed_total(&self) -> BigDecimal {
        items_total(&self.items())
    }

    /// Server total when present, otherwise the recomputed one.
    pub fn display_total(&self) -> BigDecimal {
        match &self.total {
            Some(total) => round(total.clone()),
            None => self.computed_total(),
        }
    }
}
