//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Tax-inclusive pricing extracts tax as  total / 1.10 × 0.10             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    1100 / 1.1 = 999.9999999999999  → floor × 0.1 = 99  ❌ WRONG!        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer yen everywhere, exact decimals for the one      │
//! │  division that needs them                                               │
//! │    1100 / 1.1 = 1000 exactly       → 1000 × 0.1 = 100  ✅               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use hako_core::money::Money;
//!
//! let price = Money::from_yen(1200);
//!
//! let line = price * 3u32;                   // ¥3600
//! let total = line + Money::from_yen(800);   // ¥4400
//! assert_eq!(total.yen(), 4400);
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in yen (the minor unit; yen has no subunit).
///
/// ## Design Decisions
/// - **i64 (signed)**: Discounts can push intermediate values below zero
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Transparent serde**: Serialized as a bare integer
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price ──► unit price × quantity ──► subtotal                  │
/// │                                                 │                       │
/// │  ShippingRate.price + surcharge ──► shipping_fee┤                       │
/// │                                                 │                       │
/// │  Promotion::calc_discount ──────────► discount ─┤                       │
/// │                                                 ▼                       │
/// │                                 total ──► extract_inclusive_tax         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from yen.
    ///
    /// ## Example
    /// ```rust
    /// use hako_core::money::Money;
    ///
    /// let price = Money::from_yen(1980);
    /// assert_eq!(price.yen(), 1980);
    /// ```
    #[inline]
    pub const fn from_yen(yen: i64) -> Self {
        Money(yen)
    }

    /// Returns the value in yen.
    #[inline]
    pub const fn yen(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use hako_core::money::Money;
    ///
    /// let unit_price = Money::from_yen(298);
    /// assert_eq!(unit_price.multiply_quantity(3).yen(), 894);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Extracts the tax already contained in a tax-inclusive amount.
    ///
    /// ## Formula
    /// ```text
    /// tax = floor( amount / (1 + rate) × rate )
    ///
    /// rate = 10%:  1100 / 1.10 × 0.10 = 100
    ///              1000 / 1.10 × 0.10 = 90.909... → 90
    /// ```
    ///
    /// The division runs on `rust_decimal::Decimal`, never `f64`, so amounts
    /// that divide evenly stay exact and `floor` never lands one yen short.
    ///
    /// ## Example
    /// ```rust
    /// use hako_core::money::Money;
    /// use hako_core::types::TaxRate;
    ///
    /// let total = Money::from_yen(1100);
    /// assert_eq!(total.extract_inclusive_tax(TaxRate::STANDARD).yen(), 100);
    ///
    /// let total = Money::from_yen(1000);
    /// assert_eq!(total.extract_inclusive_tax(TaxRate::STANDARD).yen(), 90);
    /// ```
    pub fn extract_inclusive_tax(&self, rate: TaxRate) -> Money {
        let rate = rate.as_decimal();
        let tax = (Decimal::from(self.0) / (Decimal::ONE + rate) * rate).floor();
        // |tax| <= |amount| so the conversion back to i64 always succeeds
        Money(tax.to_i64().unwrap_or_default())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "-¥{}", self.0.unsigned_abs())
        } else {
            write!(f, "¥{}", self.0)
        }
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

/// Multiplication by a unit count.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        Money(self.0 * i64::from(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_yen(1099).to_string(), "¥1099");
        assert_eq!(Money::from_yen(0).to_string(), "¥0");
        assert_eq!(Money::from_yen(-550).to_string(), "-¥550");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_yen(1000);
        let b = Money::from_yen(500);

        assert_eq!((a + b).yen(), 1500);
        assert_eq!((a - b).yen(), 500);
        assert_eq!((a * 3u32).yen(), 3000);

        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total.yen(), 2000);
    }

    #[test]
    fn test_serde_is_bare_integer() {
        let json = serde_json::to_string(&Money::from_yen(880)).unwrap();
        assert_eq!(json, "880");
        let back: Money = serde_json::from_str("880").unwrap();
        assert_eq!(back, Money::from_yen(880));
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 0)]
    #[case(11, 1)]
    #[case(1000, 90)]
    #[case(1100, 100)]
    #[case(3300, 300)]
    #[case(5480, 498)]
    #[case(12_345, 1122)]
    fn test_extract_inclusive_tax(#[case] total: i64, #[case] expected: i64) {
        let tax = Money::from_yen(total).extract_inclusive_tax(TaxRate::STANDARD);
        assert_eq!(tax.yen(), expected);
    }

    /// Multiples of 11 divide exactly; binary floating point gets these wrong.
    #[test]
    fn test_extract_inclusive_tax_has_no_float_drift() {
        for k in 1..=2_000i64 {
            let total = Money::from_yen(11 * k);
            assert_eq!(total.extract_inclusive_tax(TaxRate::STANDARD).yen(), k);
        }
    }

    #[test]
    fn test_extract_inclusive_tax_other_rates() {
        let total = Money::from_yen(1080);
        assert_eq!(total.extract_inclusive_tax(TaxRate::REDUCED).yen(), 80);
        assert_eq!(total.extract_inclusive_tax(TaxRate::from_percent(0)).yen(), 0);
    }
}
