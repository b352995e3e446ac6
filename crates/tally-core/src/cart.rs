//! # Cart Aggregate
//!
//! The mutable working set for one in-progress transaction.
//!
//! ## Ownership
//! One terminal session owns one cart. The cart is plain owned state passed
//! into the checkout processor - no ambient singleton, no framework context.
//! Callers that share a cart across tasks wrap it themselves (the engine's
//! processor serializes checkout attempts; see tally-engine).
//!
//! ## Invariants
//! - Lines are unique by `product_id`; adding an existing product merges
//!   into the existing line's quantity.
//! - Quantity is always >= 1 and at most [`MAX_ITEM_QUANTITY`].
//! - A line's discount never exceeds `unit_price * quantity`.
//! - The cart performs NO I/O. Stock availability is the engine's concern,
//!   checked against the live Product Store before [`Cart::add_product`].
//!
//! Not persisted: the cart is lost on session end unless snapshotted into a
//! quotation.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, TaxRate};
use crate::totals::TotalsSummary;
use crate::types::{LineItem, Product};
use crate::{MAX_CART_LINES, MAX_ITEM_QUANTITY};

/// The in-progress transaction state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Adds a product, merging into an existing line when already present.
    ///
    /// Snapshots price/taxability at this moment; later product edits do
    /// not affect the line.
    pub fn add_product(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if quantity < 1 {
            return Err(CoreError::InvalidQuantity {
                sku: product.sku.clone(),
                requested: quantity,
            });
        }

        if let Some(line) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            let merged = line.quantity + quantity;
            if merged > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    sku: line.sku.clone(),
                    requested: merged,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.quantity = merged;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge { max: MAX_CART_LINES });
        }
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                sku: product.sku.clone(),
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        self.items.push(LineItem::from_product(product, quantity));
        Ok(())
    }

    /// Removes a line. A missing line is a no-op, not an error: the cashier
    /// clicking remove twice should not see a failure.
    pub fn remove_item(&mut self, product_id: &str) {
        self.items.retain(|i| i.product_id != product_id);
    }

    /// Sets a line's quantity.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        let line = self.line_mut(product_id)?;

        if quantity < 1 {
            return Err(CoreError::InvalidQuantity {
                sku: line.sku.clone(),
                requested: quantity,
            });
        }
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                sku: line.sku.clone(),
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        // Shrinking can leave the existing discount larger than the new
        // gross amount, inverting the line's sign on the next read. Checked
        // against the prospective gross so a rejection leaves the line
        // untouched.
        let gross = line.unit_price.times(quantity);
        if line.discount > gross {
            return Err(CoreError::InvalidDiscount {
                sku: line.sku.clone(),
                requested: line.discount,
                gross,
            });
        }

        line.quantity = quantity;
        Ok(())
    }

    /// Sets a line's absolute discount.
    ///
    /// Rejected (never clamped) when negative or exceeding the gross line
    /// amount.
    pub fn update_discount(&mut self, product_id: &str, amount: Money) -> CoreResult<()> {
        let line = self.line_mut(product_id)?;

        if amount.is_negative() || amount > line.gross() {
            return Err(CoreError::InvalidDiscount {
                sku: line.sku.clone(),
                requested: amount,
                gross: line.gross(),
            });
        }

        line.discount = amount;
        Ok(())
    }

    /// Empties the cart. Used after checkout and on explicit cancel.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Immutable copy of the current lines plus derived totals.
    ///
    /// Idempotent: two snapshots without intervening mutation are equal.
    /// This is what populates a Sale or persists a Quotation.
    pub fn snapshot(&self, rate: TaxRate) -> CartSnapshot {
        CartSnapshot {
            items: self.items.clone(),
            totals: TotalsSummary::compute(&self.items, rate),
        }
    }

    fn line_mut(&mut self, product_id: &str) -> CoreResult<&mut LineItem> {
        self.items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| CoreError::LineNotFound {
                product_id: product_id.to_string(),
            })
    }
}

/// A frozen view of a cart: by-value line copies and their totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub items: Vec<LineItem>,
    pub totals: TotalsSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price_minor: i64, taxable: bool) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            sku: format!("SKU-{id}"),
            barcode: None,
            selling_price: Money::from_minor(price_minor),
            cost_price: Money::from_minor(price_minor / 2),
            stock_quantity: 10,
            taxable,
        }
    }

    #[test]
    fn add_merges_by_product_id() {
        let mut cart = Cart::new();
        let p = product("1", 999, true);

        cart.add_product(&p, 2).unwrap();
        cart.add_product(&p, 3).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn add_rejects_zero_quantity() {
        let mut cart = Cart::new();
        let err = cart.add_product(&product("1", 999, true), 0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuantity { .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn remove_missing_line_is_noop() {
        let mut cart = Cart::new();
        cart.add_product(&product("1", 999, true), 1).unwrap();
        cart.remove_item("nope");
        assert_eq!(cart.line_count(), 1);
        cart.remove_item("1");
        assert!(cart.is_empty());
    }

    #[test]
    fn update_quantity_bounds() {
        let mut cart = Cart::new();
        cart.add_product(&product("1", 999, true), 1).unwrap();

        assert!(cart.update_quantity("1", 5).is_ok());
        assert_eq!(cart.total_quantity(), 5);

        let err = cart.update_quantity("1", 0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuantity { .. }));

        let err = cart.update_quantity("nope", 2).unwrap_err();
        assert!(matches!(err, CoreError::LineNotFound { .. }));
    }

    #[test]
    fn discount_rejected_when_exceeding_gross() {
        let mut cart = Cart::new();
        cart.add_product(&product("1", 1000, true), 2).unwrap();

        // gross = 2000; exactly-gross is allowed (free line), more is not
        assert!(cart.update_discount("1", Money::from_minor(2000)).is_ok());

        let err = cart
            .update_discount("1", Money::from_minor(2001))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidDiscount { .. }));

        let err = cart
            .update_discount("1", Money::from_minor(-1))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidDiscount { .. }));
    }

    #[test]
    fn quantity_shrink_rejected_when_discount_would_invert() {
        let mut cart = Cart::new();
        cart.add_product(&product("1", 1000, true), 3).unwrap();
        cart.update_discount("1", Money::from_minor(2500)).unwrap();
        let before = cart.snapshot(TaxRate::from_bps(1650));

        // 1 x 1000 < 2500 discount
        let err = cart.update_quantity("1", 1).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDiscount { .. }));

        // Rejection leaves the line exactly as it was.
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.items()[0].discount, Money::from_minor(2500));
        assert_eq!(cart.snapshot(TaxRate::from_bps(1650)), before);
    }

    #[test]
    fn snapshot_is_idempotent() {
        let mut cart = Cart::new();
        cart.add_product(&product("1", 100_000, true), 2).unwrap();
        let rate = TaxRate::from_bps(1650);

        let a = cart.snapshot(rate);
        let b = cart.snapshot(rate);
        assert_eq!(a, b);
        assert_eq!(a.totals.total, Money::from_major(2330));
    }

    #[test]
    fn clear_empties() {
        let mut cart = Cart::new();
        cart.add_product(&product("1", 999, true), 2).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(
            cart.snapshot(TaxRate::zero()).totals,
            TotalsSummary::empty()
        );
    }
}
