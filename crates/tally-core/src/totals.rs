//! # Totals Calculator
//!
//! Pure functions turning a sequence of [`LineItem`]s into subtotal,
//! discount, tax, and total.
//!
//! ## Properties
//! - Deterministic and side-effect-free: same items + rate, same answer.
//! - The tax rate is always injected. Nothing in this module knows a
//!   default rate; that lives in configuration.
//! - Tax is computed on the taxable base only (sum of taxable line totals),
//!   rounded half-up exactly once in [`Money::tax`]. All other sums are
//!   exact integer arithmetic.
//!
//! Both the live cart and quotation conversion derive their figures from
//! these functions - there is one set of arithmetic in the system.

use serde::{Deserialize, Serialize};

use crate::money::{Money, TaxRate};
use crate::types::LineItem;

/// Sum of line totals (after per-line discounts, before tax).
pub fn subtotal(items: &[LineItem]) -> Money {
    items.iter().map(LineItem::line_total).sum()
}

/// Sum of absolute per-line discounts.
pub fn discount_total(items: &[LineItem]) -> Money {
    items.iter().map(|i| i.discount).sum()
}

/// Sum of line totals for taxable lines only.
pub fn taxable_base(items: &[LineItem]) -> Money {
    items
        .iter()
        .filter(|i| i.taxable)
        .map(LineItem::line_total)
        .sum()
}

/// Tax on the taxable base at the given rate.
pub fn tax(items: &[LineItem], rate: TaxRate) -> Money {
    taxable_base(items).tax(rate)
}

/// Grand total: `subtotal + tax`.
pub fn total(items: &[LineItem], rate: TaxRate) -> Money {
    subtotal(items) + tax(items, rate)
}

/// All derived figures for one set of items, computed in one pass over the
/// calculator functions. This is what carts snapshot, sales embed, and
/// quotations store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsSummary {
    pub subtotal: Money,
    pub discount_total: Money,
    pub tax: Money,
    pub total: Money,
}

impl TotalsSummary {
    pub fn compute(items: &[LineItem], rate: TaxRate) -> Self {
        let subtotal = subtotal(items);
        let tax = taxable_base(items).tax(rate);
        TotalsSummary {
            subtotal,
            discount_total: discount_total(items),
            tax,
            total: subtotal + tax,
        }
    }

    pub fn empty() -> Self {
        TotalsSummary {
            subtotal: Money::zero(),
            discount_total: Money::zero(),
            tax: Money::zero(),
            total: Money::zero(),
        }
    }
}
