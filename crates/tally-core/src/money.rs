//! # Money Module
//!
//! Monetary values and tax rates for Tally POS.
//!
//! ## Why Integer Money?
//! ```text
//! In floating point:  0.1 + 0.2 = 0.30000000000000004
//!
//! Our solution: integer minor units (tambala for MWK, cents for USD).
//! 1000 / 3 = 333 minor units (x3 = 999) - we KNOW we lost one unit,
//! and handle it explicitly instead of smearing it across a float.
//! ```
//!
//! ## Rounding Policy
//! Rounding happens exactly once, at the tax boundary ([`Money::tax`]),
//! using round-half-up integer arithmetic. Every other operation is exact.
//! Never round between intermediate steps; compounding rounding error is
//! how tills drift.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// - **i64 (signed)**: refunds and corrections need negative values
/// - **Single-field tuple struct**: zero-cost abstraction over i64
/// - Every monetary value in the engine flows through this type; only the
///   display layer converts to major units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Money(i64);

impl Money {
    /// Creates a value from minor units (e.g. tambala, cents).
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a value from whole major units (e.g. `Money::from_major(1000)`
    /// for K1,000.00).
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// The value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// The major-unit portion (`K10.99` -> `10`).
    #[inline]
    pub const fn major_part(&self) -> i64 {
        self.0 / 100
    }

    /// The minor-unit portion, always `0..=99`.
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative values to zero.
    ///
    /// Used for line totals where an over-sized discount must never invert
    /// the sign, and for change where non-cash tenders pay exactly.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Saturating subtraction: `max(self - other, 0)`.
    #[inline]
    pub const fn saturating_sub(&self, other: Self) -> Self {
        Money(self.0 - other.0).clamp_non_negative()
    }

    /// Computes tax on this amount at the given rate.
    ///
    /// Round-half-up integer arithmetic: `(minor * bps + 5000) / 10000`.
    /// i128 intermediate prevents overflow on large amounts. This is the
    /// single place a derived total is rounded.
    pub fn tax(&self, rate: TaxRate) -> Money {
        let minor = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money(minor as i64)
    }

    /// Multiplies by a quantity (line totals).
    #[inline]
    pub const fn times(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Debug-friendly display: `10.99`, `-5.50`. Currency symbol and locale
/// formatting belong to the display layer, not here.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major_part().abs(), self.minor_part())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate in basis points (1 bp = 0.01%).
///
/// 1650 bps = 16.5% (Malawi VAT). The rate is always injected by
/// configuration; nothing in the engine hard-codes a jurisdiction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Convenience constructor from a percentage (`16.5` -> 1650 bps).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// The rate as a percentage, for display only.
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percentage())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
