//! Checkout wizard state machine.
//!
//! The four-stage flow (`Address → Review → Payment → Confirmation`) is an
//! explicit state object with pure transition methods, decoupled from any
//! UI or transport so the same engine can back a web front end, a service,
//! or a CLI. Nothing is persisted until the submission produced by
//! [`Checkout::order_draft`] succeeds; abandoning the wizard at any
//! earlier point has no side effects, and a failed submission leaves the
//! wizard on the Payment stage for retry.

use serde::{Deserialize, Serialize};

use crate::coupon::CouponDiscount;
use crate::order::AddressSnapshot;
use crate::pricing::{self, LineItem, PriceBreakdown, PricingError, ShippingPolicy, TaxPolicy};
use crate::types::{AddressId, CouponId, CustomerId, PaymentMethod};

/// The wizard stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStage {
    Address,
    Review,
    Payment,
    Confirmation,
}

/// What the checkout was started from.
///
/// A cart checkout consumes the cart (cleared on success); a buy-now
/// checkout never touches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutSource {
    Cart,
    BuyNow,
}

/// A validated coupon held by the wizard: the id for redemption plus the
/// frozen discount snapshot for pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedCoupon {
    pub coupon_id: CouponId,
    pub code: String,
    pub discount: CouponDiscount,
}

/// Errors from wizard operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// Checkout cannot start with no items.
    #[error("cannot start checkout with an empty cart")]
    EmptyCart,
    /// Advancing past the Address stage requires a selected address.
    #[error("select a shipping address to continue")]
    MissingAddress,
    /// Submission requires a payment method.
    #[error("select a payment method to continue")]
    MissingPaymentMethod,
    /// The operation is not valid at the current stage.
    #[error("operation not valid at the {actual:?} stage (expected {expected:?})")]
    WrongStage {
        /// Stage the operation belongs to.
        expected: CheckoutStage,
        /// Stage the wizard is actually at.
        actual: CheckoutStage,
    },
    /// The item list failed pricing validation.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl CheckoutError {
    /// Stable machine-readable code for API responses.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyCart => "empty_cart",
            Self::MissingAddress => "missing_address",
            Self::MissingPaymentMethod => "missing_payment_method",
            Self::WrongStage { .. } => "wrong_checkout_stage",
            Self::Pricing(_) => "pricing_failed",
        }
    }
}

/// The immutable order submission produced at the Payment stage.
///
/// Everything here is a copy: later edits to the live address, catalog
/// prices, or the coupon never reach an order built from this draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub customer_id: Option<CustomerId>,
    pub source: CheckoutSource,
    pub items: Vec<LineItem>,
    pub address_id: AddressId,
    pub shipping_address: AddressSnapshot,
    pub payment_method: PaymentMethod,
    pub coupon: Option<AppliedCoupon>,
    pub price: PriceBreakdown,
}

/// The checkout wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkout {
    stage: CheckoutStage,
    source: CheckoutSource,
    customer_id: Option<CustomerId>,
    items: Vec<LineItem>,
    address: Option<(AddressId, AddressSnapshot)>,
    coupon: Option<AppliedCoupon>,
    payment_method: Option<PaymentMethod>,
}

impl Checkout {
    /// Start a checkout at the Address stage.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] if `items` is empty.
    pub fn begin(
        customer_id: Option<CustomerId>,
        items: Vec<LineItem>,
        source: CheckoutSource,
    ) -> Result<Self, CheckoutError> {
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        Ok(Self {
            stage: CheckoutStage::Address,
            source,
            customer_id,
            items,
            address: None,
            coupon: None,
            payment_method: None,
        })
    }

    /// Current stage.
    #[must_use]
    pub const fn stage(&self) -> CheckoutStage {
        self.stage
    }

    /// What the checkout was started from.
    #[must_use]
    pub const fn source(&self) -> CheckoutSource {
        self.source
    }

    /// The items being checked out.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Whether a successful submission should clear the source cart.
    #[must_use]
    pub const fn clears_cart(&self) -> bool {
        matches!(self.source, CheckoutSource::Cart)
    }

    /// Select the shipping address (Address stage).
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::WrongStage`] outside the Address stage.
    pub fn select_address(
        &mut self,
        id: AddressId,
        snapshot: AddressSnapshot,
    ) -> Result<(), CheckoutError> {
        self.expect_stage(CheckoutStage::Address)?;
        self.address = Some((id, snapshot));
        Ok(())
    }

    /// Advance from Address to Review.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MissingAddress`] if no address is selected
    /// and [`CheckoutError::WrongStage`] outside the Address stage.
    pub fn proceed_to_review(&mut self) -> Result<(), CheckoutError> {
        self.expect_stage(CheckoutStage::Address)?;
        if self.address.is_none() {
            return Err(CheckoutError::MissingAddress);
        }
        self.stage = CheckoutStage::Review;
        Ok(())
    }

    /// Advance from Review to Payment. Review is read-only and advances
    /// unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::WrongStage`] outside the Review stage.
    pub fn proceed_to_payment(&mut self) -> Result<(), CheckoutError> {
        self.expect_stage(CheckoutStage::Review)?;
        self.stage = CheckoutStage::Payment;
        Ok(())
    }

    /// Apply a validated coupon (Payment stage).
    ///
    /// The caller validates through [`crate::coupon::Coupon::validate`];
    /// the wizard only holds the resulting snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::WrongStage`] outside the Payment stage.
    pub fn apply_coupon(&mut self, coupon: AppliedCoupon) -> Result<(), CheckoutError> {
        self.expect_stage(CheckoutStage::Payment)?;
        self.coupon = Some(coupon);
        Ok(())
    }

    /// Remove an applied coupon (Payment stage).
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::WrongStage`] outside the Payment stage.
    pub fn remove_coupon(&mut self) -> Result<(), CheckoutError> {
        self.expect_stage(CheckoutStage::Payment)?;
        self.coupon = None;
        Ok(())
    }

    /// Select the payment method (Payment stage).
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::WrongStage`] outside the Payment stage.
    pub fn select_payment_method(&mut self, method: PaymentMethod) -> Result<(), CheckoutError> {
        self.expect_stage(CheckoutStage::Payment)?;
        self.payment_method = Some(method);
        Ok(())
    }

    /// Price the current selection under the given policies.
    ///
    /// Usable at any stage; the Payment stage shows this after coupon
    /// application.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the item list fails validation.
    pub fn price(
        &self,
        shipping: &ShippingPolicy,
        tax: &TaxPolicy,
    ) -> Result<PriceBreakdown, PricingError> {
        pricing::compute(
            &self.items,
            self.coupon.as_ref().map(|c| &c.discount),
            shipping,
            tax,
        )
    }

    /// Build the immutable order submission (Payment stage).
    ///
    /// The wizard stays at Payment: the caller persists the draft and only
    /// then calls [`Self::complete`], so a failed submission can simply be
    /// retried.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::WrongStage`] outside the Payment stage,
    /// [`CheckoutError::MissingAddress`] or
    /// [`CheckoutError::MissingPaymentMethod`] if a selection is missing,
    /// or a pricing error.
    pub fn order_draft(
        &self,
        shipping: &ShippingPolicy,
        tax: &TaxPolicy,
    ) -> Result<OrderDraft, CheckoutError> {
        self.expect_stage(CheckoutStage::Payment)?;
        let (address_id, shipping_address) =
            self.address.clone().ok_or(CheckoutError::MissingAddress)?;
        let payment_method = self
            .payment_method
            .ok_or(CheckoutError::MissingPaymentMethod)?;
        let price = self.price(shipping, tax)?;

        Ok(OrderDraft {
            customer_id: self.customer_id,
            source: self.source,
            items: self.items.clone(),
            address_id,
            shipping_address,
            payment_method,
            coupon: self.coupon.clone(),
            price,
        })
    }

    /// Move to the terminal Confirmation stage after the submission
    /// persisted successfully.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::WrongStage`] outside the Payment stage.
    pub fn complete(&mut self) -> Result<(), CheckoutError> {
        self.expect_stage(CheckoutStage::Payment)?;
        self.stage = CheckoutStage::Confirmation;
        Ok(())
    }

    fn expect_stage(&self, expected: CheckoutStage) -> Result<(), CheckoutError> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(CheckoutError::WrongStage {
                expected,
                actual: self.stage,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::coupon::CouponKind;
    use crate::types::{Money, ProductId};

    fn items() -> Vec<LineItem> {
        vec![LineItem {
            product_id: ProductId::new(1),
            name: "Canvas Tote".to_owned(),
            unit_selling_price: Money::from_rupees_i64(1000),
            unit_mrp: Money::from_rupees_i64(1200),
            quantity: 1,
            selected_color: None,
            selected_size: None,
            image_ref: "canvas-tote.jpg".to_owned(),
        }]
    }

    fn address() -> AddressSnapshot {
        AddressSnapshot {
            name: "Asha Rao".to_owned(),
            phone: "9876543210".to_owned(),
            address_line: "12 MG Road".to_owned(),
            address_line2: None,
            city: "Bengaluru".to_owned(),
            state: "Karnataka".to_owned(),
            pincode: "560001".to_owned(),
        }
    }

    fn policies() -> (ShippingPolicy, TaxPolicy) {
        (
            ShippingPolicy {
                free_above: Money::from_rupees_i64(500),
                standard_charge: Money::from_rupees_i64(50),
            },
            TaxPolicy::from_bps(1800),
        )
    }

    fn checkout_at_payment() -> Checkout {
        let mut checkout =
            Checkout::begin(Some(CustomerId::new(1)), items(), CheckoutSource::Cart).unwrap();
        checkout
            .select_address(AddressId::new(1), address())
            .unwrap();
        checkout.proceed_to_review().unwrap();
        checkout.proceed_to_payment().unwrap();
        checkout
    }

    #[test]
    fn test_empty_cart_cannot_begin() {
        let result = Checkout::begin(None, vec![], CheckoutSource::Cart);
        assert_eq!(result.unwrap_err(), CheckoutError::EmptyCart);
    }

    #[test]
    fn test_cannot_advance_without_address() {
        let mut checkout =
            Checkout::begin(Some(CustomerId::new(1)), items(), CheckoutSource::Cart).unwrap();
        assert_eq!(
            checkout.proceed_to_review(),
            Err(CheckoutError::MissingAddress)
        );
        assert_eq!(checkout.stage(), CheckoutStage::Address);
    }

    #[test]
    fn test_review_advances_unconditionally() {
        let mut checkout =
            Checkout::begin(Some(CustomerId::new(1)), items(), CheckoutSource::Cart).unwrap();
        checkout
            .select_address(AddressId::new(1), address())
            .unwrap();
        checkout.proceed_to_review().unwrap();
        assert_eq!(checkout.stage(), CheckoutStage::Review);
        checkout.proceed_to_payment().unwrap();
        assert_eq!(checkout.stage(), CheckoutStage::Payment);
    }

    #[test]
    fn test_submission_requires_payment_method() {
        let checkout = checkout_at_payment();
        let (shipping, tax) = policies();
        assert_eq!(
            checkout.order_draft(&shipping, &tax).unwrap_err(),
            CheckoutError::MissingPaymentMethod
        );
    }

    #[test]
    fn test_draft_snapshots_everything() {
        let mut checkout = checkout_at_payment();
        checkout
            .select_payment_method(PaymentMethod::Upi)
            .unwrap();
        checkout
            .apply_coupon(AppliedCoupon {
                coupon_id: CouponId::new(1),
                code: "SAVE10".to_owned(),
                discount: CouponDiscount {
                    kind: CouponKind::Percentage,
                    value: Decimal::new(10, 0),
                    max_discount: None,
                    free_shipping: false,
                },
            })
            .unwrap();

        let (shipping, tax) = policies();
        let draft = checkout.order_draft(&shipping, &tax).unwrap();
        assert_eq!(draft.price.grand_total, Money::from_rupees_i64(1062));
        assert_eq!(draft.payment_method, PaymentMethod::Upi);
        assert_eq!(draft.shipping_address, address());
        assert_eq!(draft.coupon.unwrap().code, "SAVE10");
        // The wizard stays at Payment until the caller confirms persistence.
        assert_eq!(checkout.stage(), CheckoutStage::Payment);
    }

    #[test]
    fn test_failed_submission_allows_retry() {
        let mut checkout = checkout_at_payment();
        checkout
            .select_payment_method(PaymentMethod::Cod)
            .unwrap();
        let (shipping, tax) = policies();
        // Two drafts from the same state are identical: nothing was consumed.
        let first = checkout.order_draft(&shipping, &tax).unwrap();
        let second = checkout.order_draft(&shipping, &tax).unwrap();
        assert_eq!(first, second);
        checkout.complete().unwrap();
        assert_eq!(checkout.stage(), CheckoutStage::Confirmation);
    }

    #[test]
    fn test_coupon_ops_only_at_payment() {
        let mut checkout =
            Checkout::begin(Some(CustomerId::new(1)), items(), CheckoutSource::Cart).unwrap();
        let result = checkout.apply_coupon(AppliedCoupon {
            coupon_id: CouponId::new(1),
            code: "SAVE10".to_owned(),
            discount: CouponDiscount {
                kind: CouponKind::Flat,
                value: Decimal::new(100, 0),
                max_discount: None,
                free_shipping: false,
            },
        });
        assert!(matches!(result, Err(CheckoutError::WrongStage { .. })));
    }

    #[test]
    fn test_confirmation_is_terminal() {
        let mut checkout = checkout_at_payment();
        checkout
            .select_payment_method(PaymentMethod::Card)
            .unwrap();
        checkout.complete().unwrap();
        assert!(matches!(
            checkout.select_payment_method(PaymentMethod::Upi),
            Err(CheckoutError::WrongStage { .. })
        ));
        assert!(matches!(
            checkout.complete(),
            Err(CheckoutError::WrongStage { .. })
        ));
    }

    #[test]
    fn test_buy_now_does_not_clear_cart() {
        let checkout =
            Checkout::begin(Some(CustomerId::new(1)), items(), CheckoutSource::BuyNow).unwrap();
        assert!(!checkout.clears_cart());
        let cart_checkout =
            Checkout::begin(Some(CustomerId::new(1)), items(), CheckoutSource::Cart).unwrap();
        assert!(cart_checkout.clears_cart());
    }
}
