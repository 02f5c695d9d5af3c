//! # Money and Volume
//!
//! Fixed-point amounts with checked arithmetic.
//!
//! All monetary values in the settlement engine and ledger are [`Money`]:
//! a non-negative [`Decimal`] wrapper whose operations never panic and never
//! silently wrap. Binary floating point is banned from money paths. Cargo
//! volume (CBM) uses the same validated-newtype idiom via [`Volume`].
//!
//! # Examples
//!
//! ```
//! use deal_desk::domain::value_objects::Money;
//! use rust_decimal::Decimal;
//!
//! let amount = Money::new(50_000_00, 2).unwrap(); // 50000.00
//! let fee = amount.percent(Decimal::new(25, 1)).unwrap(); // 2.5%
//! assert_eq!(fee.to_string(), "1250.00");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error type for checked amount arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ArithmeticError {
    /// Operation overflowed the decimal range.
    #[error("arithmetic overflow")]
    Overflow,

    /// Subtraction would have produced a negative amount.
    #[error("arithmetic underflow")]
    Underflow,

    /// Division by zero attempted.
    #[error("division by zero")]
    DivisionByZero,

    /// A negative value was supplied where an amount is required.
    #[error("negative amount")]
    Negative,
}

/// Result type for checked amount arithmetic.
pub type ArithmeticResult<T> = Result<T, ArithmeticError>;

/// A non-negative monetary amount with checked arithmetic.
///
/// # Invariants
///
/// - Never negative.
/// - All operations are checked; overflow and underflow surface as
///   [`ArithmeticError`], never as a panic or a wrapped value.
///
/// # Examples
///
/// ```
/// use deal_desk::domain::value_objects::Money;
///
/// let a = Money::new(100_00, 2).unwrap();
/// let b = Money::new(40_00, 2).unwrap();
///
/// assert_eq!(a.checked_sub(b).unwrap().to_string(), "60.00");
/// assert!(b.checked_sub(a).is_err()); // would go negative
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Decimal places of the settlement currency.
    pub const CURRENCY_SCALE: u32 = 2;

    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates an amount from a mantissa and scale, e.g. `new(1250_00, 2)`
    /// for `1250.00`.
    ///
    /// # Errors
    ///
    /// Returns [`ArithmeticError::Negative`] for negative mantissas.
    pub fn new(mantissa: i64, scale: u32) -> ArithmeticResult<Self> {
        Self::from_decimal(Decimal::new(mantissa, scale))
    }

    /// Creates an amount from a raw decimal.
    ///
    /// # Errors
    ///
    /// Returns [`ArithmeticError::Negative`] if the value is below zero.
    pub fn from_decimal(value: Decimal) -> ArithmeticResult<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ArithmeticError::Negative);
        }
        Ok(Self(value))
    }

    /// Returns the underlying decimal value.
    #[inline]
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly positive.
    #[inline]
    #[must_use]
    pub fn is_positive(&self) -> bool {
        !self.0.is_zero()
    }

    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`ArithmeticError::Overflow`] if the sum exceeds the decimal
    /// range.
    pub fn checked_add(self, rhs: Self) -> ArithmeticResult<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(ArithmeticError::Overflow)
    }

    /// Checked subtraction; fails instead of going negative.
    ///
    /// # Errors
    ///
    /// Returns [`ArithmeticError::Underflow`] if `rhs` exceeds `self`.
    pub fn checked_sub(self, rhs: Self) -> ArithmeticResult<Self> {
        if rhs.0 > self.0 {
            return Err(ArithmeticError::Underflow);
        }
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or(ArithmeticError::Underflow)
    }

    /// Applies a percentage rate: `self * rate / 100`, rounded to the
    /// currency scale.
    ///
    /// # Errors
    ///
    /// Returns [`ArithmeticError::Negative`] for negative rates and
    /// [`ArithmeticError::Overflow`] if the product exceeds the decimal
    /// range.
    pub fn percent(self, rate: Decimal) -> ArithmeticResult<Self> {
        if rate.is_sign_negative() {
            return Err(ArithmeticError::Negative);
        }
        let product = self
            .0
            .checked_mul(rate)
            .ok_or(ArithmeticError::Overflow)?;
        let scaled = product
            .checked_div(Decimal::ONE_HUNDRED)
            .ok_or(ArithmeticError::Overflow)?;
        Ok(Self(round_currency(scaled)))
    }

    /// Rounds the amount to the currency scale (half away from zero).
    #[must_use]
    pub fn rounded(self) -> Self {
        Self(round_currency(self.0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(Money::CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// A non-negative cargo volume in cubic meters (CBM).
///
/// Used as the alternate commission base for volume-priced deals.
///
/// # Examples
///
/// ```
/// use deal_desk::domain::value_objects::Volume;
/// use rust_decimal::Decimal;
///
/// let cbm = Volume::new(Decimal::new(125, 1)).unwrap(); // 12.5 CBM
/// let fee = cbm.times_rate(Decimal::new(80, 0)).unwrap(); // 80.00 per CBM
/// assert_eq!(fee.to_string(), "1000.00");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Volume(Decimal);

impl Volume {
    /// Zero volume.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a volume from a decimal CBM value.
    ///
    /// # Errors
    ///
    /// Returns [`ArithmeticError::Negative`] if the value is below zero.
    pub fn new(value: Decimal) -> ArithmeticResult<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ArithmeticError::Negative);
        }
        Ok(Self(value))
    }

    /// Returns the underlying decimal value.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Checked addition of two volumes.
    ///
    /// # Errors
    ///
    /// Returns [`ArithmeticError::Overflow`] if the sum exceeds the decimal
    /// range.
    pub fn checked_add(self, rhs: Self) -> ArithmeticResult<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(ArithmeticError::Overflow)
    }

    /// Multiplies the volume by a per-CBM rate, producing a currency amount.
    ///
    /// # Errors
    ///
    /// Returns [`ArithmeticError::Negative`] for negative rates and
    /// [`ArithmeticError::Overflow`] on range overflow.
    pub fn times_rate(self, rate: Decimal) -> ArithmeticResult<Money> {
        if rate.is_sign_negative() {
            return Err(ArithmeticError::Negative);
        }
        let product = self
            .0
            .checked_mul(rate)
            .ok_or(ArithmeticError::Overflow)?;
        Money::from_decimal(round_currency(product))
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} CBM", self.0)
    }
}
