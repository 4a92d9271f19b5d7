//! Stock batch payloads exchanged between the shop and the catalog.

use serde::{Deserialize, Serialize};

use crate::{Money, ProductId};

/// One requested decrement: take `amount` units of a product.
///
/// `amount` is signed so a negative request can reach the ledger and be
/// refused there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRequest {
    pub product_id: ProductId,
    pub amount: i32,
}

impl StockRequest {
    pub fn new(product_id: ProductId, amount: i32) -> Self {
        Self { product_id, amount }
    }
}

/// Price snapshot of one finalized line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub unit_price: Money,
    pub amount: u32,
    pub line_total: Money,
}

impl OrderLine {
    pub fn new(product_id: ProductId, unit_price: Money, amount: u32) -> Self {
        Self {
            product_id,
            unit_price,
            amount,
            line_total: unit_price.multiply(amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_total_is_price_times_amount() {
        let line = OrderLine::new(ProductId::new(), Money::from_cents(1050), 3);
        assert_eq!(line.line_total, Money::from_cents(3150));
    }

    #[test]
    fn wire_form_uses_camel_case() {
        let request = StockRequest::new(ProductId::new(), -1);
        let json = serde_json::to_value(request).unwrap();
        assert_eq!(json["amount"], -1);
        assert!(json.get("productId").is_some());
    }
}
