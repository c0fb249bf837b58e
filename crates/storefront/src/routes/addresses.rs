//! Address book route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bagworks_core::{AddressId, Phone, Pincode};
use serde::Deserialize;
use tracing::instrument;

use crate::db::AddressRepository;
use crate::error::{AppError, FieldError, Result};
use crate::middleware::CurrentCustomer;
use crate::models::{Address, NewAddress};
use crate::state::AppState;

/// Create address request body.
#[derive(Debug, Deserialize)]
pub struct CreateAddressRequest {
    pub name: String,
    pub phone: String,
    pub address_line: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    #[serde(default)]
    pub is_default: bool,
}

impl CreateAddressRequest {
    /// Validate into a `NewAddress`, collecting every field failure.
    fn validate(self) -> std::result::Result<NewAddress, Vec<FieldError>> {
        let mut fields = Vec::new();

        if self.name.trim().is_empty() {
            fields.push(FieldError {
                field: "name",
                message: "name cannot be empty".to_owned(),
            });
        }
        if let Err(e) = Phone::parse(&self.phone) {
            fields.push(FieldError {
                field: "phone",
                message: e.to_string(),
            });
        }
        if self.address_line.trim().is_empty() {
            fields.push(FieldError {
                field: "address_line",
                message: "address line cannot be empty".to_owned(),
            });
        }
        if self.city.trim().is_empty() {
            fields.push(FieldError {
                field: "city",
                message: "city cannot be empty".to_owned(),
            });
        }
        if self.state.trim().is_empty() {
            fields.push(FieldError {
                field: "state",
                message: "state cannot be empty".to_owned(),
            });
        }
        if let Err(e) = Pincode::parse(&self.pincode) {
            fields.push(FieldError {
                field: "pincode",
                message: e.to_string(),
            });
        }

        if !fields.is_empty() {
            return Err(fields);
        }

        Ok(NewAddress {
            name: self.name,
            phone: self.phone,
            address_line: self.address_line,
            address_line2: self.address_line2.filter(|s| !s.trim().is_empty()),
            city: self.city,
            state: self.state,
            pincode: self.pincode,
            is_default: self.is_default,
        })
    }
}

/// List the customer's addresses.
#[instrument(skip(state))]
pub async fn list(
    customer: CurrentCustomer,
    State(state): State<AppState>,
) -> Result<Json<Vec<Address>>> {
    let addresses = AddressRepository::new(state.pool()).list(customer.id).await?;
    Ok(Json(addresses))
}

/// Create an address.
#[instrument(skip(state, request))]
pub async fn create(
    customer: CurrentCustomer,
    State(state): State<AppState>,
    Json(request): Json<CreateAddressRequest>,
) -> Result<(StatusCode, Json<Address>)> {
    let new = request.validate().map_err(AppError::Validation)?;
    let address = AddressRepository::new(state.pool())
        .insert(customer.id, &new)
        .await?;
    tracing::info!(address_id = %address.id, "Address created");
    Ok((StatusCode::CREATED, Json(address)))
}

/// Make an address the customer's default.
#[instrument(skip(state))]
pub async fn set_default(
    customer: CurrentCustomer,
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
) -> Result<Json<Address>> {
    let address = AddressRepository::new(state.pool())
        .set_default(customer.id, id)
        .await?;
    Ok(Json(address))
}
