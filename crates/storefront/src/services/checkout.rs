//! Checkout orchestration.
//!
//! Drives the core checkout wizard over the repositories: resolve the
//! items (server cart or buy-now payload), walk the wizard stages,
//! validate the coupon, and persist the resulting draft.
//!
//! Submission is all-or-nothing. Coupon redemption, the order insert, and
//! cart clearing share one transaction: a failure at any sub-step rolls
//! everything back, so `used_count` is never incremented without a
//! corresponding order and the cart survives a failed submission.

use bagworks_core::checkout::{AppliedCoupon, Checkout, CheckoutError, CheckoutSource};
use bagworks_core::coupon::{CartContext, CouponRejection};
use bagworks_core::pricing::{LineItem, PriceBreakdown};
use bagworks_core::{AddressId, CategoryId, CustomerId, Money, PaymentMethod, ProductId};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::{AddressRepository, CartRepository, CouponRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::models::OrderResponse;
use crate::state::AppState;

/// A buy-now item supplied in the request body.
///
/// Cart checkouts ignore this; their items come from the server-held cart
/// so clearing can commit with the order.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutItemInput {
    pub product_id: ProductId,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub unit_selling_price: Money,
    pub unit_mrp: Money,
    pub quantity: u32,
    #[serde(default)]
    pub selected_color: Option<String>,
    #[serde(default)]
    pub selected_size: Option<String>,
    #[serde(default)]
    pub image_ref: String,
}

impl CheckoutItemInput {
    fn line_item(&self) -> LineItem {
        LineItem {
            product_id: self.product_id,
            name: self.name.clone(),
            unit_selling_price: self.unit_selling_price,
            unit_mrp: self.unit_mrp,
            quantity: self.quantity,
            selected_color: self.selected_color.clone(),
            selected_size: self.selected_size.clone(),
            image_ref: self.image_ref.clone(),
        }
    }
}

/// Request body for `POST /checkout/quote`.
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    #[serde(default = "default_source")]
    pub source: CheckoutSource,
    #[serde(default)]
    pub items: Vec<CheckoutItemInput>,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

/// Request body for `POST /orders`.
#[derive(Debug, Deserialize)]
pub struct SubmitOrderRequest {
    pub address: Option<AddressId>,
    pub payment_method: Option<PaymentMethod>,
    #[serde(default = "default_source")]
    pub source: CheckoutSource,
    #[serde(default)]
    pub items: Vec<CheckoutItemInput>,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

const fn default_source() -> CheckoutSource {
    CheckoutSource::Cart
}

/// Response body for `POST /checkout/quote`.
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub price: PriceBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
}

/// Checkout orchestration over the shared state.
pub struct CheckoutService<'a> {
    state: &'a AppState,
}

impl<'a> CheckoutService<'a> {
    /// Create a checkout service.
    #[must_use]
    pub const fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Price the current selection, applying a coupon if given.
    ///
    /// The Payment stage calls this to show the re-priced total after
    /// coupon entry; nothing is persisted.
    ///
    /// # Errors
    ///
    /// Returns coupon rejections, pricing failures, and repository errors.
    pub async fn quote(
        &self,
        customer_id: CustomerId,
        request: QuoteRequest,
    ) -> Result<QuoteResponse> {
        let (items, category_ids) = self
            .resolve_items(customer_id, request.source, &request.items)
            .await?;
        if items.is_empty() {
            return Err(AppError::Checkout(CheckoutError::EmptyCart));
        }

        let coupon = match &request.coupon_code {
            Some(code) => Some(
                self.validate_coupon(customer_id, code, &items, &category_ids)
                    .await?,
            ),
            None => None,
        };

        let price = bagworks_core::pricing::compute(
            &items,
            coupon.as_ref().map(|a| &a.discount),
            self.state.shipping_policy(),
            self.state.tax_policy(),
        )
        .map_err(CheckoutError::from)
        .map_err(AppError::Checkout)?;

        Ok(QuoteResponse {
            price,
            coupon_code: coupon.map(|a| a.code),
        })
    }

    /// Submit an order: walk the wizard, validate, persist atomically.
    ///
    /// On success the source cart is cleared (cart checkouts only) and the
    /// created order is returned. On failure nothing is observably
    /// applied and the caller may retry the same submission.
    ///
    /// # Errors
    ///
    /// Returns wizard errors (`missing_address`, `missing_payment_method`,
    /// `empty_cart`), coupon rejections, and repository errors.
    pub async fn submit(
        &self,
        customer_id: CustomerId,
        request: SubmitOrderRequest,
    ) -> Result<OrderResponse> {
        let (items, category_ids) = self
            .resolve_items(customer_id, request.source, &request.items)
            .await?;

        let mut checkout = Checkout::begin(Some(customer_id), items, request.source)
            .map_err(AppError::Checkout)?;

        // Address stage: selection is optional in the body so the wizard
        // itself reports missing_address.
        if let Some(address_id) = request.address {
            let address = AddressRepository::new(self.state.pool())
                .get(customer_id, address_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("address {address_id}")))?;
            checkout
                .select_address(address.id, address.snapshot())
                .map_err(AppError::Checkout)?;
        }
        checkout.proceed_to_review().map_err(AppError::Checkout)?;
        checkout.proceed_to_payment().map_err(AppError::Checkout)?;

        if let Some(code) = &request.coupon_code {
            let applied = self
                .validate_coupon(customer_id, code, checkout.items(), &category_ids)
                .await?;
            checkout.apply_coupon(applied).map_err(AppError::Checkout)?;
        }
        if let Some(method) = request.payment_method {
            checkout
                .select_payment_method(method)
                .map_err(AppError::Checkout)?;
        }

        let draft = checkout
            .order_draft(self.state.shipping_policy(), self.state.tax_policy())
            .map_err(AppError::Checkout)?;

        let order_number = generate_order_number();

        let mut tx = self.state.pool().begin().await.map_err(to_repo_error)?;
        if let Some(applied) = &draft.coupon {
            let redeemed = CouponRepository::redeem(&mut *tx, applied.coupon_id).await?;
            if !redeemed {
                // A concurrent checkout took the last use; roll back.
                tx.rollback().await.map_err(to_repo_error)?;
                return Err(AppError::Coupon(CouponRejection::Exhausted));
            }
        }
        let record = OrderRepository::create_in(&mut tx, &draft, &order_number).await?;
        if checkout.clears_cart() {
            CartRepository::clear_in(&mut tx, customer_id).await?;
        }
        tx.commit().await.map_err(to_repo_error)?;

        checkout.complete().map_err(AppError::Checkout)?;

        tracing::info!(
            order_id = %record.id,
            order_number = %record.order_number,
            customer_id = %customer_id,
            grand_total = %draft.price.grand_total,
            "Order placed"
        );

        let response = record.into_response(draft.items)?;
        Ok(response)
    }

    /// Resolve the items being checked out, plus their category scope.
    async fn resolve_items(
        &self,
        customer_id: CustomerId,
        source: CheckoutSource,
        body_items: &[CheckoutItemInput],
    ) -> Result<(Vec<LineItem>, Vec<CategoryId>)> {
        match source {
            CheckoutSource::Cart => {
                let rows = CartRepository::new(self.state.pool())
                    .items(customer_id)
                    .await?;
                let items = rows.iter().map(crate::models::CartItem::line_item).collect();
                let categories = rows.iter().filter_map(|r| r.category_id).collect();
                Ok((items, categories))
            }
            CheckoutSource::BuyNow => {
                let items = body_items.iter().map(CheckoutItemInput::line_item).collect();
                let categories = body_items.iter().filter_map(|i| i.category_id).collect();
                Ok((items, categories))
            }
        }
    }

    /// Validate a coupon code against the resolved items.
    async fn validate_coupon(
        &self,
        customer_id: CustomerId,
        code: &str,
        items: &[LineItem],
        category_ids: &[CategoryId],
    ) -> Result<AppliedCoupon> {
        let coupon = CouponRepository::new(self.state.pool())
            .find_by_code(code)
            .await?
            .ok_or(AppError::Coupon(CouponRejection::NotFound))?;

        let prior_orders = OrderRepository::new(self.state.pool())
            .count_prior_orders(customer_id)
            .await?;

        let subtotal: Money = items.iter().map(LineItem::line_total).sum();
        let context = CartContext {
            subtotal,
            category_ids: category_ids.to_vec(),
            is_first_order: prior_orders == 0,
        };

        let discount = coupon
            .validate(&context, Utc::now())
            .map_err(AppError::Coupon)?;

        Ok(AppliedCoupon {
            coupon_id: coupon.id,
            code: coupon.code,
            discount,
        })
    }
}

/// Generate a human-readable order number.
fn generate_order_number() -> String {
    format!("ORD-{:08}", rand::random::<u32>())
}

fn to_repo_error(err: sqlx::Error) -> AppError {
    AppError::Repository(crate::db::RepositoryError::Database(err))
}
