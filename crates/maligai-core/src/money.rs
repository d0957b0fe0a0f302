//! # Money and Quantity
//!
//! Fixed-point value types for prices and weights.
//!
//! ## Why Integers?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  0.1 + 0.2 = 0.30000000000000004  ❌                                    │
//! │  1.5 kg × ₹45.10 summed over a day drifts by paise                      │
//! │                                                                         │
//! │  OUR SOLUTION                                                           │
//! │    Money    = integer paise        (₹45.10  → 4510)                     │
//! │    Quantity = integer thousandths  (1.5 kg  → 1500)                     │
//! │                                                                         │
//! │  Floats only appear at the JSON boundary, where the persisted layout    │
//! │  and the QR payment payload carry plain decimal numbers.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use maligai_core::money::{Money, Quantity};
//!
//! let price = Money::from_major_minor(45, 0);     // ₹45.00 per kg
//! let weight = Quantity::parse("1.5").unwrap();   // 1.5 kg
//! assert_eq!(price.times(weight), Money::from_paise(6750));
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use crate::error::ValidationError;

/// Paise per rupee.
const MONEY_SCALE: i64 = 100;

/// Thousandths per unit (kg, pack, piece).
const QUANTITY_SCALE: i64 = 1000;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paise).
///
/// ## Design Decisions
/// - **i64 (signed)**: differences between totals may be negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serde as decimal number**: `45.5` on disk, `4550` in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    ///
    /// ```rust
    /// use maligai_core::money::Money;
    ///
    /// let price = Money::from_paise(4550); // ₹45.50
    /// assert_eq!(price.paise(), 4550);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from rupees and paise.
    ///
    /// For negative amounts only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -₹5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * MONEY_SCALE - minor)
        } else {
            Money(major * MONEY_SCALE + minor)
        }
    }

    /// Parses a decimal string such as `"45"`, `"45.5"` or `"45.50"`.
    ///
    /// More than two fractional digits is rejected rather than rounded.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        parse_fixed(input, 2).map(Money).ok_or_else(|| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("'{}' is not a decimal amount with at most 2 places", input.trim()),
        })
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / MONEY_SCALE
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % MONEY_SCALE).abs()
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

    /// Multiplies a unit price by a (possibly fractional) quantity.
    ///
    /// ## Rounding
    /// `paise × thousandths / 1000`, rounded half away from zero
    /// (`+500` before the division, same trick as the tax math).
    ///
    /// ```rust
    /// use maligai_core::money::{Money, Quantity};
    ///
    /// // ₹45.00 × 3 kg = ₹135.00
    /// let total = Money::from_major_minor(45, 0).times(Quantity::from_units(3));
    /// assert_eq!(total, Money::from_major_minor(135, 0));
    ///
    /// // ₹33.33 × 0.5 kg = ₹16.665 → ₹16.67
    /// let half = Money::from_paise(3333).times(Quantity::from_milli(500));
    /// assert_eq!(half.paise(), 1667);
    /// ```
    pub fn times(&self, quantity: Quantity) -> Money {
        // i128 keeps large catalogs × large stock from overflowing
        let raw = self.0 as i128 * quantity.milli() as i128;
        let half = QUANTITY_SCALE as i128 / 2;
        let rounded = if raw >= 0 {
            (raw + half) / QUANTITY_SCALE as i128
        } else {
            (raw - half) / QUANTITY_SCALE as i128
        };
        Money(rounded as i64)
    }

    /// Value in rupees as a float, for the JSON boundary only.
    fn as_major_f64(&self) -> f64 {
        self.0 as f64 / MONEY_SCALE as f64
    }

    /// Formats with a currency symbol, e.g. `₹45.00`.
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}{}.{:02}", sign, symbol, self.rupees().abs(), self.paise_part())
    }
}

/// Plain decimal without a symbol, e.g. `45.00`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.rupees().abs(), self.paise_part())
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

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_major_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_any(FixedVisitor { scale: MONEY_SCALE, digits: 2, what: "an amount" })
            .map(Money)
    }
}

// =============================================================================
// Quantity Type
// =============================================================================

/// A quantity or stock level in thousandths of a unit.
///
/// Loose goods are sold by weight in half-kilogram steps, packs by the
/// piece; both fit in the same fixed-point representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Quantity(i64);

impl Quantity {
    /// Smallest quantity the operator can request (half a unit).
    pub const MIN_STEP: Quantity = Quantity(QUANTITY_SCALE / 2);

    /// Quantity used when the operator input is blank or unparseable.
    pub const ONE: Quantity = Quantity(QUANTITY_SCALE);

    #[inline]
    pub const fn from_milli(milli: i64) -> Self {
        Quantity(milli)
    }

    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * QUANTITY_SCALE)
    }

    /// Parses `"3"`, `"1.5"`, `"0.25"` (up to three decimal places).
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        parse_fixed(input, 3).map(Quantity).ok_or_else(|| ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: format!("'{}' is not a decimal quantity", input.trim()),
        })
    }

    /// Parses any finite decimal and rounds it to the nearest thousandth.
    ///
    /// For operator-typed quantities, where `"0.2505"` should mean a
    /// quarter kilogram rather than be refused.
    ///
    /// ```rust
    /// use maligai_core::money::Quantity;
    ///
    /// assert_eq!(Quantity::parse_rounded("0.2506").unwrap(), Quantity::from_milli(251));
    /// assert!(Quantity::parse_rounded("NaN").is_err());
    /// ```
    pub fn parse_rounded(input: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: format!("'{}' is not a decimal quantity", input.trim()),
        };

        let value: f64 = input.trim().parse().map_err(|_| invalid())?;
        Self::from_units_rounded(value).ok_or_else(invalid)
    }

    /// `None` for NaN and infinities.
    pub(crate) fn from_units_rounded(units: f64) -> Option<Self> {
        units
            .is_finite()
            .then(|| Quantity((units * QUANTITY_SCALE as f64).round() as i64))
    }

    #[inline]
    pub const fn milli(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps a proposed quantity to the half-unit minimum.
    pub fn clamp_to_minimum(self) -> Self {
        self.max(Self::MIN_STEP)
    }

    /// The `-` / `+` buttons next to a product: moves by `delta`
    /// and never drops below half a unit.
    ///
    /// ```rust
    /// use maligai_core::money::Quantity;
    ///
    /// let one = Quantity::ONE;
    /// assert_eq!(one.stepped(Quantity::from_milli(-500)), Quantity::from_milli(500));
    /// assert_eq!(Quantity::from_milli(500).stepped(Quantity::from_milli(-500)), Quantity::MIN_STEP);
    /// ```
    pub fn stepped(self, delta: Quantity) -> Self {
        Quantity(self.0 + delta.0).clamp_to_minimum()
    }

    /// `self - other`, floored at zero. Used for stock decrements.
    pub fn minus_floored(self, other: Quantity) -> Self {
        Quantity((self.0 - other.0).max(0))
    }

    fn as_units_f64(&self) -> f64 {
        self.0 as f64 / QUANTITY_SCALE as f64
    }
}

/// Shortest decimal form: `3`, `1.5`, `0.25`.
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        let whole = abs / QUANTITY_SCALE;
        let frac = abs % QUANTITY_SCALE;
        if frac == 0 {
            return write!(f, "{}{}", sign, whole);
        }
        let digits = format!("{:03}", frac);
        write!(f, "{}{}.{}", sign, whole, digits.trim_end_matches('0'))
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Self {
        iter.fold(Quantity::zero(), Add::add)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_units_f64())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_any(FixedVisitor { scale: QUANTITY_SCALE, digits: 3, what: "a quantity" })
            .map(Quantity)
    }
}

// =============================================================================
// Fixed-point helpers
// =============================================================================

/// Parses an unsigned-or-negative decimal string into a scaled integer.
fn parse_fixed(input: &str, digits: u32) -> Option<i64> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if frac.len() > digits as usize {
        return None;
    }
    let scale = 10i64.pow(digits);
    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let frac_value: i64 = if frac.is_empty() {
        0
    } else {
        frac.parse::<i64>().ok()? * 10i64.pow(digits - frac.len() as u32)
    };
    let value = whole.checked_mul(scale)?.checked_add(frac_value)?;
    Some(if negative { -value } else { value })
}

struct FixedVisitor {
    scale: i64,
    digits: u32,
    what: &'static str,
}

impl<'de> Visitor<'de> for FixedVisitor {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} as a decimal number", self.what)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        v.checked_mul(self.scale)
            .ok_or_else(|| E::custom(format!("{} out of range", self.what)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        i64::try_from(v)
            .ok()
            .and_then(|v| v.checked_mul(self.scale))
            .ok_or_else(|| E::custom(format!("{} out of range", self.what)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
        if !v.is_finite() {
            return Err(E::custom(format!("{} must be finite", self.what)));
        }
        Ok((v * self.scale as f64).round() as i64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
        parse_fixed(v, self.digits).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(4550);
        assert_eq!(money.paise(), 4550);
        assert_eq!(money.rupees(), 45);
        assert_eq!(money.paise_part(), 50);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_paise(4550).to_string(), "45.50");
        assert_eq!(Money::from_paise(-550).to_string(), "-5.50");
        assert_eq!(Money::from_paise(27000).format_with("₹"), "₹270.00");
    }

    #[test]
    fn test_parse_money() {
        assert_eq!(Money::parse("45").unwrap().paise(), 4500);
        assert_eq!(Money::parse(" 45.5 ").unwrap().paise(), 4550);
        assert_eq!(Money::parse("0.05").unwrap().paise(), 5);
        assert!(Money::parse("45.555").is_err());
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("").is_err());
    }

    #[test]
    fn test_times_whole_and_fractional() {
        let price = Money::from_major_minor(45, 0);
        assert_eq!(price.times(Quantity::from_units(6)).paise(), 27000);
        assert_eq!(price.times(Quantity::from_milli(1500)).paise(), 6750);
        assert_eq!(price.times(Quantity::zero()), Money::zero());
    }

    #[test]
    fn test_quantity_parse_and_display() {
        assert_eq!(Quantity::parse("1.5").unwrap(), Quantity::from_milli(1500));
        assert_eq!(Quantity::parse("3").unwrap().to_string(), "3");
        assert_eq!(Quantity::from_milli(1500).to_string(), "1.5");
        assert_eq!(Quantity::from_milli(250).to_string(), "0.25");
        assert!(Quantity::parse("1.2345").is_err());
    }

    #[test]
    fn test_quantity_clamps_to_half_unit() {
        assert_eq!(Quantity::zero().clamp_to_minimum(), Quantity::MIN_STEP);
        assert_eq!(Quantity::from_milli(-2000).clamp_to_minimum(), Quantity::MIN_STEP);
        assert_eq!(Quantity::from_units(2).clamp_to_minimum(), Quantity::from_units(2));
        assert_eq!(
            Quantity::ONE.stepped(Quantity::from_milli(500)),
            Quantity::from_milli(1500)
        );
    }

    #[test]
    fn test_minus_floored() {
        let stock = Quantity::from_units(2);
        assert_eq!(stock.minus_floored(Quantity::from_units(5)), Quantity::zero());
        assert_eq!(stock.minus_floored(Quantity::from_milli(500)), Quantity::from_milli(1500));
    }

    #[test]
    fn test_serde_accepts_numbers_and_strings() {
        let m: Money = serde_json::from_str("45").unwrap();
        assert_eq!(m.paise(), 4500);
        let m: Money = serde_json::from_str("45.1").unwrap();
        assert_eq!(m.paise(), 4510);
        let m: Money = serde_json::from_str("\"12.30\"").unwrap();
        assert_eq!(m.paise(), 1230);

        let q: Quantity = serde_json::from_str("2.5").unwrap();
        assert_eq!(q.milli(), 2500);
        assert_eq!(serde_json::to_string(&Quantity::from_units(4)).unwrap(), "4.0");
        assert_eq!(serde_json::to_string(&Money::from_paise(27050)).unwrap(), "270.5");
    }
}
