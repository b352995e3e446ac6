//! # Receipt Numbering
//!
//! Timestamp-derived receipt numbers: `RCP-yymmdd-HHMMSS-nnnn`, where the
//! suffix comes from the sub-second nanos. Not sequential on purpose -
//! terminals generate these offline without coordination, and second-level
//! timestamp plus a 4-digit suffix makes collisions effectively impossible
//! for a till that completes a handful of sales per second at worst.
//!
//! Converted quotations keep their origin visible instead:
//! `Q-<quotation_number>`.

use chrono::Utc;

/// Generates a receipt number for a live checkout.
pub fn generate_receipt_number() -> String {
    let now = Utc::now();
    let nanos = now.timestamp_subsec_nanos();
    let suffix = nanos % 10_000;
    format!("RCP-{}-{:04}", now.format("%y%m%d-%H%M%S"), suffix)
}

/// Receipt number for a sale converted from a quotation.
pub fn conversion_receipt_number(quotation_number: &str) -> String {
    format!("Q-{quotation_number}")
}
