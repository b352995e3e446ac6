//! # Validation Module
//!
//! Input validation at the engine boundary, before business logic runs.
//! The cart and sale constructors enforce their own invariants; these
//! validators exist so malformed input is rejected with a field-level
//! message instead of surfacing as a deeper domain error.

use crate::error::{ValidationError, ValidationResult};
use crate::money::Money;
use crate::MAX_ITEM_QUANTITY;

/// Validates a quantity: positive, at most [`MAX_ITEM_QUANTITY`].
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    match qty {
        q if q <= 0 => Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }),
        q if q > MAX_ITEM_QUANTITY => Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        }),
        _ => Ok(()),
    }
}

/// Validates a discount amount: non-negative.
///
/// The per-line ceiling (discount <= gross) depends on the line and is
/// enforced by `Cart::update_discount`.
pub fn validate_discount(amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a tendered payment amount: strictly positive.
pub fn validate_tendered(amount: Money) -> ValidationResult<()> {
    if amount.minor() <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "tendered amount".to_string(),
        });
    }
    Ok(())
}

/// Validates a tax rate in basis points: 0% to 100%.
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }
    Ok(())
}

/// Validates a SKU: non-empty, at most 50 chars, alphanumeric plus `-`/`_`.
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();
    let sku_ok = |c: char| c.is_alphanumeric() || matches!(c, '-' | '_');

    if sku.is_empty() {
        Err(ValidationError::Required {
            field: "sku".to_string(),
        })
    } else if sku.len() > 50 {
        Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        })
    } else if let Some(bad) = sku.chars().find(|&c| !sku_ok(c)) {
        Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: format!("character {bad:?} is not allowed"),
        })
    } else {
        Ok(())
    }
}
