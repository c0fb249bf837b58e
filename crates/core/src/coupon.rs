//! Coupon rules and validation.
//!
//! A [`Coupon`] is the stored promotion; validation against a cart yields
//! a [`CouponDiscount`] snapshot - the frozen discount terms the pricing
//! calculator consumes. Later edits to the coupon never affect an
//! in-flight checkout, because only the snapshot travels onward.
//!
//! Validation checks run in a fixed order and report the first failure;
//! `used_count` bookkeeping is *not* done here - it moves only at final
//! order placement, in the same transaction that stores the order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, CouponId, Money};

/// Coupon discount kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    /// `value` is a percentage of the subtotal (0 < value <= 100).
    Percentage,
    /// `value` is a rupee amount.
    Flat,
}

impl std::fmt::Display for CouponKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Percentage => write!(f, "percentage"),
            Self::Flat => write!(f, "flat"),
        }
    }
}

impl std::str::FromStr for CouponKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(Self::Percentage),
            "flat" => Ok(Self::Flat),
            _ => Err(format!("invalid coupon kind: {s}")),
        }
    }
}

/// A stored coupon.
///
/// Codes are case-insensitive and held uppercase; [`normalize_code`] is
/// applied before any lookup or storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    pub kind: CouponKind,
    pub value: Decimal,
    pub min_cart_value: Money,
    pub max_discount: Option<Money>,
    pub usage_limit: Option<u32>,
    pub used_count: u32,
    pub valid_from: DateTime<Utc>,
    pub valid_till: DateTime<Utc>,
    pub is_active: bool,
    pub applicable_category_ids: Vec<CategoryId>,
    pub first_order_only: bool,
    pub free_shipping: bool,
}

/// Normalize a coupon code for lookup and storage.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// The cart facts a coupon is validated against.
#[derive(Debug, Clone)]
pub struct CartContext {
    pub subtotal: Money,
    pub category_ids: Vec<CategoryId>,
    pub is_first_order: bool,
}

/// Why a coupon was rejected.
///
/// Ordering matters: validation reports the first failing condition, never
/// a silent fallback.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CouponRejection {
    /// No coupon exists for the code (produced by the lookup layer).
    #[error("coupon code not found")]
    NotFound,
    /// The coupon is disabled.
    #[error("this coupon is currently inactive")]
    Inactive,
    /// Outside the validity window.
    #[error("this coupon has expired or is not yet valid")]
    Expired,
    /// Usage limit reached.
    #[error("this coupon has been fully redeemed")]
    Exhausted,
    /// Cart subtotal below the coupon minimum.
    #[error("add {shortfall} more to use this coupon (minimum cart value {min})")]
    MinCartNotMet {
        /// Required minimum cart value.
        min: Money,
        /// Amount missing from the cart.
        shortfall: Money,
    },
    /// Coupon is restricted to a customer's first order.
    #[error("this coupon is valid only on your first order")]
    NotFirstOrder,
    /// No cart item falls in the coupon's category scope.
    #[error("this coupon does not apply to the items in your cart")]
    CategoryNotEligible,
}

impl CouponRejection {
    /// Stable machine-readable code for API responses.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "coupon_not_found",
            Self::Inactive => "coupon_inactive",
            Self::Expired => "coupon_expired",
            Self::Exhausted => "coupon_exhausted",
            Self::MinCartNotMet { .. } => "min_cart_not_met",
            Self::NotFirstOrder => "not_first_order",
            Self::CategoryNotEligible => "category_not_eligible",
        }
    }
}

/// The frozen discount terms captured at validation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponDiscount {
    pub kind: CouponKind,
    pub value: Decimal,
    pub max_discount: Option<Money>,
    pub free_shipping: bool,
}

impl CouponDiscount {
    /// The discount this snapshot grants on `subtotal`.
    ///
    /// Percentage discounts round half-up to the paisa and are capped at
    /// `max_discount`; flat discounts never exceed the subtotal.
    #[must_use]
    pub fn discount_on(&self, subtotal: Money) -> Money {
        let raw = match self.kind {
            CouponKind::Percentage => {
                let fraction = Decimal::from(subtotal.paise()) * self.value
                    / Decimal::ONE_HUNDRED;
                Money::from_paise(round_half_up_paise(fraction))
            }
            CouponKind::Flat => {
                Money::from_paise(round_half_up_paise(self.value * Decimal::ONE_HUNDRED))
            }
        };
        let capped = self
            .max_discount
            .map_or(raw, |max| raw.min(max));
        capped.min(subtotal)
    }
}

/// Round a decimal paise amount half-up to a whole paisa count.
fn round_half_up_paise(paise: Decimal) -> i64 {
    paise
        .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

impl Coupon {
    /// Validate this coupon against a cart, yielding a discount snapshot.
    ///
    /// Checks run in order: active flag, validity window, usage limit,
    /// minimum cart value, first-order restriction, category scope. The
    /// first failing check is returned.
    ///
    /// # Errors
    ///
    /// Returns the first applicable [`CouponRejection`].
    pub fn validate(
        &self,
        cart: &CartContext,
        now: DateTime<Utc>,
    ) -> Result<CouponDiscount, CouponRejection> {
        if !self.is_active {
            return Err(CouponRejection::Inactive);
        }
        if now < self.valid_from || now > self.valid_till {
            return Err(CouponRejection::Expired);
        }
        if let Some(limit) = self.usage_limit
            && self.used_count >= limit
        {
            return Err(CouponRejection::Exhausted);
        }
        if cart.subtotal < self.min_cart_value {
            return Err(CouponRejection::MinCartNotMet {
                min: self.min_cart_value,
                shortfall: self.min_cart_value - cart.subtotal,
            });
        }
        if self.first_order_only && !cart.is_first_order {
            return Err(CouponRejection::NotFirstOrder);
        }
        if !self.applicable_category_ids.is_empty()
            && !cart
                .category_ids
                .iter()
                .any(|id| self.applicable_category_ids.contains(id))
        {
            return Err(CouponRejection::CategoryNotEligible);
        }

        Ok(CouponDiscount {
            kind: self.kind,
            value: self.value,
            max_discount: self.max_discount,
            free_shipping: self.free_shipping,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample_coupon() -> Coupon {
        Coupon {
            id: CouponId::new(1),
            code: "SAVE10".to_owned(),
            kind: CouponKind::Percentage,
            value: Decimal::new(10, 0),
            min_cart_value: Money::from_rupees_i64(200),
            max_discount: None,
            usage_limit: Some(100),
            used_count: 0,
            valid_from: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            valid_till: Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 59).unwrap(),
            is_active: true,
            applicable_category_ids: vec![],
            first_order_only: false,
            free_shipping: false,
        }
    }

    fn cart(subtotal_rupees: i64) -> CartContext {
        CartContext {
            subtotal: Money::from_rupees_i64(subtotal_rupees),
            category_ids: vec![CategoryId::new(1)],
            is_first_order: false,
        }
    }

    fn mid_2026() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  save10 "), "SAVE10");
        assert_eq!(normalize_code("Flat100"), "FLAT100");
    }

    #[test]
    fn test_valid_coupon_yields_snapshot() {
        let snapshot = sample_coupon().validate(&cart(1000), mid_2026()).unwrap();
        assert_eq!(snapshot.kind, CouponKind::Percentage);
        assert_eq!(snapshot.value, Decimal::new(10, 0));
        assert!(!snapshot.free_shipping);
    }

    #[test]
    fn test_inactive_reported_before_expiry() {
        let mut coupon = sample_coupon();
        coupon.is_active = false;
        coupon.valid_till = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        // Both inactive and expired: the active flag is checked first.
        assert_eq!(
            coupon.validate(&cart(1000), mid_2026()),
            Err(CouponRejection::Inactive)
        );
    }

    #[test]
    fn test_expired_outside_window() {
        let coupon = sample_coupon();
        let before = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            coupon.validate(&cart(1000), before),
            Err(CouponRejection::Expired)
        );
        assert_eq!(
            coupon.validate(&cart(1000), after),
            Err(CouponRejection::Expired)
        );
        // The last second of the window is still valid.
        assert!(coupon.validate(&cart(1000), coupon.valid_till).is_ok());
    }

    #[test]
    fn test_exhausted_at_limit() {
        let mut coupon = sample_coupon();
        coupon.usage_limit = Some(5);
        coupon.used_count = 5;
        assert_eq!(
            coupon.validate(&cart(1000), mid_2026()),
            Err(CouponRejection::Exhausted)
        );
    }

    #[test]
    fn test_min_cart_reports_shortfall() {
        let result = sample_coupon().validate(&cart(50), mid_2026());
        assert_eq!(
            result,
            Err(CouponRejection::MinCartNotMet {
                min: Money::from_rupees_i64(200),
                shortfall: Money::from_rupees_i64(150),
            })
        );
    }

    #[test]
    fn test_min_cart_dominates_other_fields() {
        // Below minimum always reports MinCartNotMet, whatever else is set.
        let mut coupon = sample_coupon();
        coupon.first_order_only = true;
        coupon.applicable_category_ids = vec![CategoryId::new(99)];
        let result = coupon.validate(&cart(50), mid_2026());
        assert!(matches!(
            result,
            Err(CouponRejection::MinCartNotMet { .. })
        ));
    }

    #[test]
    fn test_first_order_only() {
        let mut coupon = sample_coupon();
        coupon.first_order_only = true;
        assert_eq!(
            coupon.validate(&cart(1000), mid_2026()),
            Err(CouponRejection::NotFirstOrder)
        );

        let mut first_cart = cart(1000);
        first_cart.is_first_order = true;
        assert!(coupon.validate(&first_cart, mid_2026()).is_ok());
    }

    #[test]
    fn test_category_scope() {
        let mut coupon = sample_coupon();
        coupon.applicable_category_ids = vec![CategoryId::new(7), CategoryId::new(8)];
        assert_eq!(
            coupon.validate(&cart(1000), mid_2026()),
            Err(CouponRejection::CategoryNotEligible)
        );

        let mut eligible = cart(1000);
        eligible.category_ids = vec![CategoryId::new(3), CategoryId::new(8)];
        assert!(coupon.validate(&eligible, mid_2026()).is_ok());
    }

    #[test]
    fn test_snapshot_survives_coupon_edits() {
        let mut coupon = sample_coupon();
        let snapshot = coupon.validate(&cart(1000), mid_2026()).unwrap();
        coupon.value = Decimal::new(50, 0);
        coupon.free_shipping = true;
        // The snapshot keeps the terms from validation time.
        assert_eq!(
            snapshot.discount_on(Money::from_rupees_i64(1000)),
            Money::from_rupees_i64(100)
        );
        assert!(!snapshot.free_shipping);
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        let snapshot = CouponDiscount {
            kind: CouponKind::Percentage,
            value: Decimal::new(10, 0),
            max_discount: None,
            free_shipping: false,
        };
        // 10% of 10.05 rupees = 100.5 paise, rounds up to 101.
        assert_eq!(
            snapshot.discount_on(Money::from_paise(1005)),
            Money::from_paise(101)
        );
    }

    #[test]
    fn test_rejection_codes_are_stable() {
        assert_eq!(CouponRejection::NotFound.code(), "coupon_not_found");
        assert_eq!(
            CouponRejection::MinCartNotMet {
                min: Money::ZERO,
                shortfall: Money::ZERO,
            }
            .code(),
            "min_cart_not_met"
        );
    }
}
