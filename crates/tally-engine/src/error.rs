//! # Engine Errors
//!
//! Error surface of the checkout/conversion engine.
//!
//! ## What is NOT an error here
//! Queued-offline persistence and per-line stock-decrement failures are
//! recoverable, best-effort conditions: the sale is logically committed
//! the moment the Record Store accepts it. They are reported inside
//! [`CheckoutOutcome`](crate::checkout::CheckoutOutcome), never as `Err`.

use thiserror::Error;

use crate::store::StoreError;
use tally_core::CoreError;

/// Errors surfaced by the checkout processor and quotation converter.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Validation or conflict error from the domain layer
    /// (empty cart, insufficient payment, not-convertible, ...).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A second checkout attempted while one is already past Validating.
    /// Conflict class: retry only after the first attempt settles.
    #[error("a checkout is already in progress for this cart")]
    CheckoutInProgress,

    /// The Product Store has no such product.
    #[error("product not found: {product_id}")]
    ProductNotFound { product_id: String },

    /// No product carries the scanned barcode.
    #[error("no product with barcode {barcode}")]
    BarcodeNotFound { barcode: String },

    /// The Record Store has no such quotation.
    #[error("quotation not found: {quotation_id}")]
    QuotationNotFound { quotation_id: String },

    /// Hard collaborator failure (not the queued-offline path).
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience alias for Results with [`EngineError`].
pub type EngineResult<T> = Result<T, EngineError>;
