//! Fixed-point money type.
//!
//! All monetary amounts are whole counts of paise (the smallest INR unit)
//! held in an `i64`. Arithmetic is exact integer arithmetic; binary
//! floating point never touches a price. [`rust_decimal`] is used only at
//! the boundary, for rupee conversion and display.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Sub};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Money`] value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The rupee amount has sub-paisa precision.
    #[error("amount has sub-paisa precision: {0}")]
    SubPaisaPrecision(Decimal),
    /// The amount does not fit in the representable range.
    #[error("amount out of range: {0}")]
    OutOfRange(Decimal),
    /// The amount is negative where a non-negative amount is required.
    #[error("amount cannot be negative: {0}")]
    Negative(Decimal),
}

/// A monetary amount in paise.
///
/// Serializes as the bare paise integer, so `₹10.50` is `1050` on the wire.
///
/// ## Examples
///
/// ```
/// use bagworks_core::Money;
/// use rust_decimal::Decimal;
///
/// let price = Money::from_paise(105_000);
/// assert_eq!(price.rupees(), Decimal::new(1050, 0));
/// assert_eq!(price.to_string(), "₹1050.00");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero paise.
    pub const ZERO: Self = Self(0);

    /// Create a `Money` from a paise count.
    #[must_use]
    pub const fn from_paise(paise: i64) -> Self {
        Self(paise)
    }

    /// Create a `Money` from a whole-rupee count.
    #[must_use]
    pub const fn from_rupees_i64(rupees: i64) -> Self {
        Self(rupees * 100)
    }

    /// Create a `Money` from a decimal rupee amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative, carries sub-paisa
    /// precision, or does not fit in `i64` paise.
    pub fn from_rupees(rupees: Decimal) -> Result<Self, MoneyError> {
        if rupees.is_sign_negative() && !rupees.is_zero() {
            return Err(MoneyError::Negative(rupees));
        }
        let paise = rupees
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(MoneyError::OutOfRange(rupees))?;
        if paise.fract() != Decimal::ZERO {
            return Err(MoneyError::SubPaisaPrecision(rupees));
        }
        paise
            .to_i64()
            .map(Self)
            .ok_or(MoneyError::OutOfRange(rupees))
    }

    /// Get the paise count.
    #[must_use]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Get the amount as a decimal rupee value with paisa precision.
    #[must_use]
    pub fn rupees(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Whether the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiply by a line quantity.
    #[must_use]
    pub const fn times(&self, quantity: u32) -> Self {
        Self(self.0 * quantity as i64)
    }

    /// Subtract, clamping at zero instead of going negative.
    #[must_use]
    pub const fn saturating_sub(&self, other: Self) -> Self {
        let diff = self.0 - other.0;
        if diff < 0 { Self::ZERO } else { Self(diff) }
    }

    /// The smaller of two amounts.
    #[must_use]
    pub const fn min(self, other: Self) -> Self {
        if self.0 <= other.0 { self } else { other }
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{:.2}", self.rupees())
    }
}

// SQLx support (with postgres feature): stored as BIGINT paise.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let paise = <i64 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(paise))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rupees_whole() {
        let m = Money::from_rupees(Decimal::new(1050, 0)).unwrap();
        assert_eq!(m.paise(), 105_000);
    }

    #[test]
    fn test_from_rupees_with_paise() {
        let m = Money::from_rupees(Decimal::new(99950, 2)).unwrap();
        assert_eq!(m.paise(), 99_950);
    }

    #[test]
    fn test_from_rupees_sub_paisa_rejected() {
        let result = Money::from_rupees(Decimal::new(10005, 3));
        assert!(matches!(result, Err(MoneyError::SubPaisaPrecision(_))));
    }

    #[test]
    fn test_from_rupees_negative_rejected() {
        let result = Money::from_rupees(Decimal::new(-1, 0));
        assert!(matches!(result, Err(MoneyError::Negative(_))));
    }

    #[test]
    fn test_times() {
        assert_eq!(Money::from_rupees_i64(250).times(3).paise(), 75_000);
    }

    #[test]
    fn test_saturating_sub_clamps() {
        let small = Money::from_paise(100);
        let big = Money::from_paise(500);
        assert_eq!(small.saturating_sub(big), Money::ZERO);
        assert_eq!(big.saturating_sub(small).paise(), 400);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 200, 300].map(Money::from_paise).into_iter().sum();
        assert_eq!(total.paise(), 600);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_paise(106_200).to_string(), "₹1062.00");
        assert_eq!(Money::from_paise(50).to_string(), "₹0.50");
    }

    #[test]
    fn test_serde_as_paise() {
        let m = Money::from_paise(1050);
        assert_eq!(serde_json::to_string(&m).unwrap(), "1050");
        let parsed: Money = serde_json::from_str("1050").unwrap();
        assert_eq!(parsed, m);
    }
}
