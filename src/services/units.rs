//! Conversions between an item's stock unit and its selling unit.
//!
//! The conversion factor is "selling units per one stock unit" and is kept
//! strictly positive by the inventory lifecycle; a non-positive factor
//! reaching these functions means a corrupted record, not bad user input.

use rust_decimal::Decimal;

use crate::errors::ServiceError;

fn ensure_positive_factor(conversion_factor: Decimal) -> Result<(), ServiceError> {
    if conversion_factor <= Decimal::ZERO {
        return Err(ServiceError::InternalError(format!(
            "conversion factor must be positive, got {conversion_factor}"
        )));
    }
    Ok(())
}

/// Quantity held in stock units, expressed in selling units.
pub fn to_selling_units(
    stock_quantity: Decimal,
    conversion_factor: Decimal,
) -> Result<Decimal, ServiceError> {
    ensure_positive_factor(conversion_factor)?;
    Ok(stock_quantity * conversion_factor)
}

/// Quantity requested in selling units, expressed in stock units.
pub fn to_stock_units(
    selling_quantity: Decimal,
    conversion_factor: Decimal,
) -> Result<Decimal, ServiceError> {
    ensure_positive_factor(conversion_factor)?;
    Ok(selling_quantity / conversion_factor)
}

/// Cost tracked per stock unit, expressed per selling unit.
pub fn cost_per_selling_unit(
    cost_per_stock_unit: Decimal,
    conversion_factor: Decimal,
) -> Result<Decimal, ServiceError> {
    ensure_positive_factor(conversion_factor)?;
    Ok(cost_per_stock_unit / conversion_factor)
}
