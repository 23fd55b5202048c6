//! Weighted-average cost valuation.
//!
//! An item carries a single running cost per stock unit. Every stock entry
//! merged into an existing item reweights that cost by quantity; per-batch
//! cost history is not retained beyond the snapshot taken at sale time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A (quantity, cost-per-stock-unit) pair, either the item's current state
/// or an incoming batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StockBatch {
    pub quantity: Decimal,
    pub price: Decimal,
}

/// Merges an incoming batch into existing stock.
///
/// The result quantity is the sum of both quantities; the result price is the
/// quantity-weighted average of both prices. When the combined quantity is not
/// positive the batch price wins, which keeps the degenerate zero-stock case
/// away from a division by zero.
///
/// Callers validate that `added.quantity > 0` before merging; a non-positive
/// batch is rejected upstream rather than silently absorbed here.
pub fn merge_batch(existing: StockBatch, added: StockBatch) -> StockBatch {
    let new_quantity = existing.quantity + added.quantity;
    let new_price = if new_quantity > Decimal::ZERO {
        let existing_value = existing.quantity * existing.price;
        let added_value = added.quantity * added.price;
        (existing_value + added_value) / new_quantity
    } else {
        added.price
    };
    StockBatch {
        quantity: new_quantity,
        price: new_price,
    }
}
