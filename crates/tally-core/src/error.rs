//! # Error Types
//!
//! Domain errors for tally-core.
//!
//! ## Taxonomy
//! ```text
//! Validation errors  - caller-correctable, never partially mutate state
//!   EmptyCart, InvalidQuantity, InvalidDiscount, InsufficientPayment,
//!   OutOfStock, CartTooLarge
//!
//! Conflict errors    - state-machine precondition violations; no retry
//!   without a state change
//!   NotConvertible
//!
//! Infrastructure errors (queued-offline, per-line decrement failures)
//! are NOT errors at this layer; the engine models them as outcomes.
//! ```
//!
//! ## Design Principles
//! 1. `thiserror` derive, never manual impls
//! 2. Context in the message (SKU, amounts), never bare strings
//! 3. Enum variants, so callers can match

use thiserror::Error;

use crate::money::Money;
use crate::types::QuotationStatus;

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout requires at least one line item.
    #[error("cart is empty")]
    EmptyCart,

    /// Quantities are integers >= 1.
    #[error("invalid quantity {requested} for {sku}: must be at least 1")]
    InvalidQuantity { sku: String, requested: i64 },

    /// Quantity ceiling, guards against fat-finger entry (1000 vs 10).
    #[error("quantity {requested} for {sku} exceeds maximum of {max}")]
    QuantityTooLarge {
        sku: String,
        requested: i64,
        max: i64,
    },

    /// Line discounts are absolute, non-negative, and may not exceed the
    /// gross line amount (a discount cannot invert a line's sign).
    #[error("invalid discount {requested} for {sku}: must be between 0 and {gross}")]
    InvalidDiscount {
        sku: String,
        requested: Money,
        gross: Money,
    },

    /// The referenced product has no line in the cart.
    #[error("product {product_id} not in cart")]
    LineNotFound { product_id: String },

    /// Cash tendered falls short of the sale total.
    #[error("insufficient payment: tendered {tendered}, required {required}")]
    InsufficientPayment { required: Money, tendered: Money },

    /// Product Store reports no sellable stock at add-to-cart time.
    #[error("out of stock: {sku} has {available} available, requested {requested}")]
    OutOfStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// Cart line-count ceiling.
    #[error("cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Quotation is not in a convertible state. A second conversion attempt,
    /// an expired quotation, and a rejected quotation all land here.
    #[error("quotation {quotation_number} is {status:?}, cannot convert")]
    NotConvertible {
        quotation_number: String,
        status: QuotationStatus,
    },

    /// Input validation failure (wraps [`ValidationError`]).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Input validation errors, raised before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Convenience alias for Results with [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience alias for Results with [`ValidationError`].
pub type ValidationResult<T> = Result<T, ValidationError>;
