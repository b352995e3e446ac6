//! # tally-core: Pure Business Logic for Tally POS
//!
//! The heart of the checkout and quotation-conversion engine: all business
//! arithmetic and state as pure, I/O-free code.
//!
//! ## Architecture Position
//! ```text
//!   UI / terminal session
//!          │
//!          ▼
//!   tally-engine        checkout processor, quotation converter,
//!          │            store contracts (async I/O lives here)
//!          ▼
//!   tally-core (THIS CRATE)
//!     money    Money (integer minor units), TaxRate (basis points)
//!     totals   subtotal / taxable base / tax / total calculator
//!     cart     the mutable working set for one transaction
//!     types    LineItem, Sale (immutable), Quotation, Payment
//!     validation, error
//!
//!   NO I/O - NO DATABASE - NO NETWORK - PURE FUNCTIONS
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: same input, same output. Expiry checks take an
//!    explicit `now` rather than reading the clock.
//! 2. **Integer money**: all monetary values are minor units in an i64;
//!    rounding happens exactly once, at the tax boundary.
//! 3. **Explicit errors**: typed enums via thiserror, never strings.
//! 4. **Immutable sales**: a [`Sale`] is built once, validated, and never
//!    mutated; corrections are new compensating records.
//!
//! ## Example
//! ```rust
//! use tally_core::cart::Cart;
//! use tally_core::money::{Money, TaxRate};
//! use tally_core::types::Product;
//!
//! let product = Product {
//!     id: "p1".into(),
//!     name: "Sugar 1kg".into(),
//!     sku: "SUG-1".into(),
//!     barcode: None,
//!     selling_price: Money::from_major(1000),
//!     cost_price: Money::from_major(700),
//!     stock_quantity: 25,
//!     taxable: true,
//! };
//!
//! let mut cart = Cart::new();
//! cart.add_product(&product, 2).unwrap();
//!
//! let snapshot = cart.snapshot(TaxRate::from_bps(1650));
//! assert_eq!(snapshot.totals.total, Money::from_major(2330));
//! ```

pub mod cart;
pub mod error;
pub mod money;
pub mod totals;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartSnapshot};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, TaxRate};
pub use totals::TotalsSummary;
pub use types::{
    Customer, LineItem, Payment, PaymentMethod, Product, Quotation, QuotationStatus, Sale,
    SaleStatus,
};

/// Maximum distinct lines in a single cart.
///
/// Prevents runaway carts and keeps transaction sizes reasonable. Could be
/// made configurable per store later.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line.
///
/// Guards against fat-finger entry (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
