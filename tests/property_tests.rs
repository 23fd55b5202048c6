//! Property-based tests for the valuation and unit-conversion helpers.
//!
//! These exercise invariants across a wide range of quantities, prices and
//! conversion factors, catching edge cases the example-based tests miss.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use tradestock_core::services::{
    units,
    valuation::{merge_batch, StockBatch},
};

// Strategies for generating test data

fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    // 0.00 .. 10_000.00
    (0i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn positive_quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn price_strategy() -> impl Strategy<Value = Decimal> {
    // 0.00 .. 100_000.00
    (0i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn factor_strategy() -> impl Strategy<Value = Decimal> {
    // 0.001 .. 100.000
    (1i64..100_000).prop_map(|thousandths| Decimal::new(thousandths, 3))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn merged_quantity_is_the_sum(
        existing_qty in quantity_strategy(),
        existing_price in price_strategy(),
        added_qty in positive_quantity_strategy(),
        added_price in price_strategy(),
    ) {
        let merged = merge_batch(
            StockBatch { quantity: existing_qty, price: existing_price },
            StockBatch { quantity: added_qty, price: added_price },
        );
        prop_assert_eq!(merged.quantity, existing_qty + added_qty);
    }

    #[test]
    fn merged_price_stays_within_the_batch_price_bounds(
        existing_qty in quantity_strategy(),
        existing_price in price_strategy(),
        added_qty in positive_quantity_strategy(),
        added_price in price_strategy(),
    ) {
        let merged = merge_batch(
            StockBatch { quantity: existing_qty, price: existing_price },
            StockBatch { quantity: added_qty, price: added_price },
        );
        let low = existing_price.min(added_price);
        let high = existing_price.max(added_price);
        prop_assert!(
            merged.price >= low && merged.price <= high,
            "weighted average {} escaped [{}, {}]",
            merged.price,
            low,
            high
        );
    }

    #[test]
    fn merge_preserves_total_stock_value(
        existing_qty in quantity_strategy(),
        existing_price in price_strategy(),
        added_qty in positive_quantity_strategy(),
        added_price in price_strategy(),
    ) {
        let merged = merge_batch(
            StockBatch { quantity: existing_qty, price: existing_price },
            StockBatch { quantity: added_qty, price: added_price },
        );
        let value_before = existing_qty * existing_price + added_qty * added_price;
        let value_after = merged.quantity * merged.price;
        let drift = (value_after - value_before).abs();
        prop_assert!(
            drift <= dec!(0.000001),
            "value drifted by {drift} (before {value_before}, after {value_after})"
        );
    }

    #[test]
    fn conversion_round_trip_is_exact(
        quantity in quantity_strategy(),
        factor in factor_strategy(),
    ) {
        let selling = units::to_selling_units(quantity, factor).unwrap();
        let back = units::to_stock_units(selling, factor).unwrap();
        prop_assert_eq!(back, quantity);
    }

    #[test]
    fn cost_per_selling_unit_scales_back_up(
        price in price_strategy(),
        factor in factor_strategy(),
    ) {
        let per_selling = units::cost_per_selling_unit(price, factor).unwrap();
        let drift = (per_selling * factor - price).abs();
        prop_assert!(drift <= dec!(0.000001), "cost drifted by {drift}");
    }
}

proptest! {
    #[test]
    fn degenerate_zero_merge_takes_the_batch_price(price in price_strategy()) {
        let merged = merge_batch(
            StockBatch { quantity: Decimal::ZERO, price: dec!(100) },
            StockBatch { quantity: Decimal::ZERO, price },
        );
        prop_assert_eq!(merged.quantity, Decimal::ZERO);
        prop_assert_eq!(merged.price, price);
    }
}
