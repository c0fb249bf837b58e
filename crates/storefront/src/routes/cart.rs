//! Cart route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bagworks_core::{CartItemId, CategoryId, Money, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::CartRepository;
use crate::db::carts::NewCartItem;
use crate::error::{AppError, FieldError, Result};
use crate::middleware::CurrentCustomer;
use crate::models::CartItem;
use crate::state::AppState;

/// Cart response body: the rows plus their subtotal.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub subtotal: Money,
    pub item_count: u32,
}

impl CartResponse {
    fn from_items(items: Vec<CartItem>) -> Self {
        let subtotal = items
            .iter()
            .map(|i| i.unit_selling_price.times(u32::try_from(i.quantity).unwrap_or(0)))
            .sum();
        let item_count = items
            .iter()
            .map(|i| u32::try_from(i.quantity).unwrap_or(0))
            .sum();
        Self {
            items,
            subtotal,
            item_count,
        }
    }
}

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddCartItemRequest {
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

impl AddCartItemRequest {
    fn validate(self) -> std::result::Result<NewCartItem, Vec<FieldError>> {
        let mut fields = Vec::new();

        if self.name.trim().is_empty() {
            fields.push(FieldError {
                field: "name",
                message: "name cannot be empty".to_owned(),
            });
        }
        if self.quantity == 0 {
            fields.push(FieldError {
                field: "quantity",
                message: "quantity must be at least 1".to_owned(),
            });
        }
        if self.unit_selling_price > self.unit_mrp {
            fields.push(FieldError {
                field: "unit_selling_price",
                message: "selling price cannot exceed MRP".to_owned(),
            });
        }

        if !fields.is_empty() {
            return Err(fields);
        }

        Ok(NewCartItem {
            product_id: self.product_id,
            category_id: self.category_id,
            name: self.name,
            unit_selling_price: self.unit_selling_price,
            unit_mrp: self.unit_mrp,
            quantity: self.quantity,
            selected_color: self.selected_color,
            selected_size: self.selected_size,
            image_ref: self.image_ref,
        })
    }
}

/// Update-quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

/// Show the cart.
#[instrument(skip(state))]
pub async fn show(
    customer: CurrentCustomer,
    State(state): State<AppState>,
) -> Result<Json<CartResponse>> {
    let items = CartRepository::new(state.pool()).items(customer.id).await?;
    Ok(Json(CartResponse::from_items(items)))
}

/// Add an item to the cart, merging quantities for repeats.
#[instrument(skip(state, request))]
pub async fn add(
    customer: CurrentCustomer,
    State(state): State<AppState>,
    Json(request): Json<AddCartItemRequest>,
) -> Result<(StatusCode, Json<CartItem>)> {
    let new = request.validate().map_err(AppError::Validation)?;
    let item = CartRepository::new(state.pool())
        .upsert(customer.id, &new)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Set the quantity on a cart row.
#[instrument(skip(state))]
pub async fn update_quantity(
    customer: CurrentCustomer,
    State(state): State<AppState>,
    Path(id): Path<CartItemId>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartItem>> {
    if request.quantity == 0 {
        return Err(AppError::Validation(vec![FieldError {
            field: "quantity",
            message: "quantity must be at least 1; delete the item instead".to_owned(),
        }]));
    }
    let item = CartRepository::new(state.pool())
        .update_quantity(customer.id, id, request.quantity)
        .await?;
    Ok(Json(item))
}

/// Remove a cart row.
#[instrument(skip(state))]
pub async fn remove(
    customer: CurrentCustomer,
    State(state): State<AppState>,
    Path(id): Path<CartItemId>,
) -> Result<StatusCode> {
    CartRepository::new(state.pool())
        .remove(customer.id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Empty the cart.
#[instrument(skip(state))]
pub async fn clear(
    customer: CurrentCustomer,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    CartRepository::new(state.pool()).clear(customer.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
