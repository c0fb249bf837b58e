//! Cart pricing.
//!
//! One shared computation turns priced line items plus an optional coupon
//! snapshot into a full [`PriceBreakdown`]. Admin previews and checkout
//! totals both go through here, so the two can never drift.
//!
//! All arithmetic is integer paise. The only rounding steps are the
//! percentage-coupon amount and the final tax amount, both half-up to the
//! paisa; every other component is exact, so
//! `grand_total = subtotal - coupon_discount + shipping + tax` always
//! holds to the paisa.

use serde::{Deserialize, Serialize};

use crate::coupon::CouponDiscount;
use crate::types::{Money, ProductId};

/// A priced line in a cart or order.
///
/// The selling price is what the customer pays per unit; MRP is the listed
/// pre-discount price. Quantity must be at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_selling_price: Money,
    pub unit_mrp: Money,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_size: Option<String>,
    pub image_ref: String,
}

impl LineItem {
    /// Line total at the selling price.
    #[must_use]
    pub const fn line_total(&self) -> Money {
        self.unit_selling_price.times(self.quantity)
    }

    /// Line total at MRP.
    #[must_use]
    pub const fn line_mrp_total(&self) -> Money {
        self.unit_mrp.times(self.quantity)
    }
}

/// Shipping charge policy.
///
/// Orders with a subtotal strictly above `free_above` ship free; otherwise
/// `standard_charge` applies (unless the coupon grants free shipping).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingPolicy {
    pub free_above: Money,
    pub standard_charge: Money,
}

/// Tax policy expressed in basis points (1800 = 18% GST).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxPolicy {
    pub rate_bps: u32,
}

impl TaxPolicy {
    /// Create a policy from a basis-point rate.
    #[must_use]
    pub const fn from_bps(rate_bps: u32) -> Self {
        Self { rate_bps }
    }

    /// Tax on `amount`, rounded half-up to the paisa.
    #[must_use]
    pub const fn tax_on(&self, amount: Money) -> Money {
        let numerator = amount.paise() * self.rate_bps as i64;
        Money::from_paise((numerator + 5_000) / 10_000)
    }
}

/// The derived price breakdown for a cart.
///
/// Never persisted as-is; orders snapshot it at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub mrp_total: Money,
    pub subtotal: Money,
    pub product_discount: Money,
    pub coupon_discount: Money,
    pub shipping: Money,
    pub tax: Money,
    pub grand_total: Money,
}

/// Errors from price computation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// The item list is empty.
    #[error("cannot price an empty item list")]
    EmptyCart,
    /// An item has a zero quantity.
    #[error("item {product_id} has zero quantity")]
    ZeroQuantity {
        /// Offending product.
        product_id: ProductId,
    },
}

/// Compute the price breakdown for a set of line items.
///
/// The tax base is the coupon-discounted subtotal; shipping is untaxed.
///
/// # Errors
///
/// Returns [`PricingError::EmptyCart`] for an empty item list and
/// [`PricingError::ZeroQuantity`] if any item has `quantity == 0`.
pub fn compute(
    items: &[LineItem],
    coupon: Option<&CouponDiscount>,
    shipping_policy: &ShippingPolicy,
    tax_policy: &TaxPolicy,
) -> Result<PriceBreakdown, PricingError> {
    if items.is_empty() {
        return Err(PricingError::EmptyCart);
    }
    if let Some(item) = items.iter().find(|i| i.quantity == 0) {
        return Err(PricingError::ZeroQuantity {
            product_id: item.product_id,
        });
    }

    let mrp_total: Money = items.iter().map(LineItem::line_mrp_total).sum();
    let subtotal: Money = items.iter().map(LineItem::line_total).sum();

    // Inconsistent catalog data (MRP below selling price) clamps to zero
    // rather than producing a negative discount.
    let product_discount = mrp_total.saturating_sub(subtotal);

    let coupon_discount = coupon.map_or(Money::ZERO, |c| c.discount_on(subtotal));
    let taxable = subtotal - coupon_discount;

    let free_shipping =
        coupon.is_some_and(|c| c.free_shipping) || subtotal > shipping_policy.free_above;
    let shipping = if free_shipping {
        Money::ZERO
    } else {
        shipping_policy.standard_charge
    };

    let tax = tax_policy.tax_on(taxable);
    let grand_total = taxable + shipping + tax;

    Ok(PriceBreakdown {
        mrp_total,
        subtotal,
        product_discount,
        coupon_discount,
        shipping,
        tax,
        grand_total,
    })
}
