//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing invoice lines in binary floating point:                        │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  The total check compares Σ line totals with the declared total to     │
//! │  within one cent. Drift in the sum would make that comparison lie.      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every amount is parsed once from its decimal text into cents,        │
//! │    then summed and compared exactly.                                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! ```text
//! JSON in:   1500, 1500.5, "1500.50"   ──► Money(150050)
//! JSON out:  Money(150050)             ──► 1500.5
//! Display:   Money(150050)             ──► "$1500.50"
//! ```
//!
//! ## Usage
//! ```rust
//! use invoice_core::money::Money;
//!
//! let price = Money::from_cents(2500); // $25.00
//! let line = price.multiply_quantity(40);
//! assert_eq!(line.to_string(), "$1000.00");
//!
//! let parsed = Money::parse_decimal("1000.00").unwrap();
//! assert_eq!(parsed, line);
//! ```

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Differences between totals can be negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Custom serde**: Major units on the wire, cents in memory and storage
///
/// ## Where Money is Used
/// ```text
/// InvoiceItem.unit_price ──┐
///                          ├──► InvoiceItem.total ──► Σ ──► compared with
/// InvoiceItem.quantity ────┘                              Invoice.total_amount
///
/// Invoice.total_amount ──► Displayed as "$1500.00" in the PDF
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use invoice_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    ///
    /// ## Example
    /// ```rust
    /// use invoice_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).dollars(), 10);
    /// assert_eq!(Money::from_cents(-550).dollars(), -5);
    /// ```
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value, saturating at `i64::MAX` cents.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.saturating_abs())
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Subtracts `other`, `None` on overflow.
    #[inline]
    pub const fn checked_sub(self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Sums amounts, `None` if any partial sum overflows.
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount))
    }

    /// Multiplies money by a quantity, saturating on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use invoice_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(2500); // $25.00
    /// assert_eq!(unit_price.multiply_quantity(40).cents(), 100_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Returns the value in major units as a float, for wire output only.
    ///
    /// Never feed the result back into arithmetic.
    #[inline]
    pub fn to_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parses a decimal string ("1500", "1500.5", "-3.999") into cents.
    ///
    /// ## Rounding
    /// Digits beyond the second decimal place are rounded half away from
    /// zero: `"0.125"` becomes 13 cents, `"0.1249"` becomes 12 cents.
    ///
    /// ## Errors
    /// `ValidationError::InvalidFormat` for anything that is not an optionally
    /// signed run of digits with at most one decimal point, or that overflows.
    pub fn parse_decimal(raw: &str) -> Result<Money, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let trimmed = raw.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (unsigned, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid("expected a decimal number"));
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid("expected a decimal number"));
        }

        let mut cents: i64 = 0;
        for digit in int_part.bytes() {
            cents = cents
                .checked_mul(10)
                .and_then(|c| c.checked_add(i64::from(digit - b'0')))
                .ok_or_else(|| invalid("amount is too large"))?;
        }

        let mut frac_digits = frac_part.bytes().map(|b| i64::from(b - b'0'));
        let tenths = frac_digits.next().unwrap_or(0);
        let hundredths = frac_digits.next().unwrap_or(0);
        let round_up = frac_digits.next().map_or(false, |d| d >= 5);

        cents = cents
            .checked_mul(100)
            .and_then(|c| c.checked_add(tenths * 10 + hundredths + i64::from(round_up)))
            .ok_or_else(|| invalid("amount is too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as `$1500.00` (two decimals, no grouping).
///
/// This is the format used on rendered invoices.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// Operators saturate; use the checked_* methods where overflow must be reported.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_major_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

/// Accepts integers, floats and decimal strings.
///
/// Floats go through their shortest decimal text, so `25.1` is read as the
/// decimal 25.10 rather than its binary approximation.
struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a currency amount as a number or decimal string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        v.checked_mul(100)
            .map(Money)
            .ok_or_else(|| E::custom("amount is too large"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        let v = i64::try_from(v).map_err(|_| E::custom("amount is too large"))?;
        self.visit_i64(v)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        if !v.is_finite() {
            return Err(E::custom("amount must be a finite number"));
        }
        Money::parse_decimal(&v.to_string()).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        Money::parse_decimal(v).map_err(E::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(150_000)), "$1500.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);

        let total: Money = [a, b, Money::from_cents(1)].iter().sum();
        assert_eq!(total.cents(), 1501);
    }

    #[test]
    fn test_checked_arithmetic_reports_overflow() {
        let near_max = Money::from_cents(i64::MAX - 10);

        assert_eq!(near_max.checked_add(Money::from_cents(10)), Some(Money::from_cents(i64::MAX)));
        assert_eq!(near_max.checked_add(Money::from_cents(11)), None);
        assert_eq!(Money::from_cents(i64::MIN).checked_sub(Money::from_cents(1)), None);
        assert_eq!(Money::checked_sum([near_max, near_max]), None);
        assert_eq!(
            Money::checked_sum([Money::from_cents(1), Money::from_cents(2)]),
            Some(Money::from_cents(3))
        );
    }

    #[test]
    fn test_operators_saturate_instead_of_panicking() {
        let near_max = Money::from_cents(i64::MAX - 1);
        assert_eq!((near_max + near_max).cents(), i64::MAX);
        assert_eq!(Money::from_cents(i64::MIN).abs().cents(), i64::MAX);
        assert_eq!(near_max.multiply_quantity(3).cents(), i64::MAX);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Money::parse_decimal("1500").unwrap().cents(), 150_000);
        assert_eq!(Money::parse_decimal("1500.5").unwrap().cents(), 150_050);
        assert_eq!(Money::parse_decimal("0.07").unwrap().cents(), 7);
        assert_eq!(Money::parse_decimal(".5").unwrap().cents(), 50);
        assert_eq!(Money::parse_decimal("-3.25").unwrap().cents(), -325);
    }

    #[test]
    fn test_parse_decimal_rounds_half_away_from_zero() {
        assert_eq!(Money::parse_decimal("0.125").unwrap().cents(), 13);
        assert_eq!(Money::parse_decimal("0.1249").unwrap().cents(), 12);
        assert_eq!(Money::parse_decimal("-0.125").unwrap().cents(), -13);
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        assert!(Money::parse_decimal("").is_err());
        assert!(Money::parse_decimal(".").is_err());
        assert!(Money::parse_decimal("12a").is_err());
        assert!(Money::parse_decimal("1.2.3").is_err());
        assert!(Money::parse_decimal("99999999999999999999").is_err());
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let from_int: Money = serde_json::from_str("1500").unwrap();
        let from_float: Money = serde_json::from_str("25.1").unwrap();
        let from_str: Money = serde_json::from_str("\"499.99\"").unwrap();

        assert_eq!(from_int.cents(), 150_000);
        assert_eq!(from_float.cents(), 2510);
        assert_eq!(from_str.cents(), 49_999);
    }

    #[test]
    fn test_float_drift_does_not_leak_into_cents() {
        // 0.1 + 0.2 in f64 is 0.30000000000000004; parsed amounts stay exact
        let a: Money = serde_json::from_str("0.1").unwrap();
        let b: Money = serde_json::from_str("0.2").unwrap();
        let c: Money = serde_json::from_str("0.3").unwrap();
        assert_eq!(a + b, c);
    }

    #[test]
    fn test_serialize_as_major_units() {
        let json = serde_json::to_value(Money::from_cents(150_000)).unwrap();
        assert_eq!(json.as_f64(), Some(1500.0));

        let json = serde_json::to_value(Money::from_cents(2510)).unwrap();
        assert_eq!(json.as_f64(), Some(25.1));
    }
}
