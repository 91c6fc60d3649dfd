//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! All monetary values in the system are integer cents wrapped in this type;
//! floating point never enters domain arithmetic. The deployment assumes a
//! single currency, so `Money` carries no currency tag.
//!
//! ## Wire Format
//! The CSV import/export contract renders prices and amounts in "plain"
//! form: whole amounts without a decimal point (`20`), fractional amounts
//! with exactly two places (`20.50`). [`Money::to_plain_string`] and
//! [`Money::parse_plain`] implement both directions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// Signed, so differences (margin = price - cost) stay representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use merch_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts, only the major unit should be negative:
    /// `from_major_minor(-5, 50)` = -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
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

    /// Checks if the value is strictly positive.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Renders the value in the plain wire form used by the CSV codec.
    ///
    /// ## Rules
    /// - Whole amounts render without a decimal point: `2000` cents → `"20"`
    /// - Fractional amounts render with exactly two places: `2050` → `"20.50"`
    ///
    /// ## Example
    /// ```rust
    /// use merch_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(2000).to_plain_string(), "20");
    /// assert_eq!(Money::from_cents(2050).to_plain_string(), "20.50");
    /// assert_eq!(Money::from_cents(-550).to_plain_string(), "-5.50");
    /// ```
    pub fn to_plain_string(&self) -> String {
        if self.0 % 100 == 0 {
            (self.0 / 100).to_string()
        } else {
            let sign = if self.0 < 0 { "-" } else { "" };
            format!("{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
        }
    }

    /// Parses the plain wire form back into a Money value.
    ///
    /// Accepts `"20"`, `"20.5"`, and `"20.50"`; rejects anything with more
    /// than two fractional digits, signs in the wrong place, or non-digits.
    pub fn parse_plain(input: &str) -> Option<Money> {
        let input = input.trim();
        let (negative, digits) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input),
        };

        let (major_part, minor_part) = match digits.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (digits, ""),
        };

        if major_part.is_empty() || !major_part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        if minor_part.len() > 2 || !minor_part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let major: i64 = major_part.parse().ok()?;
        // "20.5" means 50 cents, not 5
        let minor: i64 = if minor_part.is_empty() {
            0
        } else if minor_part.len() == 1 {
            minor_part.parse::<i64>().ok()? * 10
        } else {
            minor_part.parse().ok()?
        };

        let cents = major.checked_mul(100)?.checked_add(minor)?;
        Some(Money(if negative { -cents } else { cents }))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_plain_string())
    }
}

// =============================================================================
// Arithmetic Operations
// =============================================================================

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, rhs: i64) -> Money {
        Money(self.0 * rhs)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
