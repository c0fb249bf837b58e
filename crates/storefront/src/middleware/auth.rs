//! Authentication extractor.
//!
//! Token issuance lives in the external auth service; the storefront only
//! resolves `Authorization: Bearer <token>` against the `shop.api_tokens`
//! table. Handlers that need the caller take a [`CurrentCustomer`]
//! argument and get a 401 JSON rejection for free.

use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use bagworks_core::CustomerId;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Extractor for the authenticated customer.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(
///     customer: CurrentCustomer,
///     State(state): State<AppState>,
/// ) -> Result<Json<Vec<Address>>> {
///     let addresses = AddressRepository::new(state.pool()).list(customer.id).await?;
///     Ok(Json(addresses))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CurrentCustomer {
    pub id: CustomerId,
}

impl FromRequestParts<AppState> for CurrentCustomer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_owned()))?;

        let row: Option<(CustomerId,)> = sqlx::query_as(
            r"
            SELECT customer_id FROM shop.api_tokens
            WHERE token = $1 AND expires_at > NOW()
            ",
        )
        .bind(token)
        .fetch_optional(state.pool())
        .await
        .map_err(crate::db::RepositoryError::from)?;

        let (customer_id,) =
            row.ok_or_else(|| AppError::Unauthorized("invalid or expired token".to_owned()))?;

        Ok(Self { id: customer_id })
    }
}

/// Pull a UUID bearer token out of the Authorization header.
fn bearer_token(parts: &Parts) -> Option<Uuid> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with_auth(value: &str) -> Parts {
        let request = Request::builder()
            .uri("/user/addresses")
            .header(header::AUTHORIZATION, value)
            .body(())
            .unwrap();
        request.into_parts().0
    }

    #[test]
    fn test_bearer_token_parses_uuid() {
        let token = Uuid::new_v4();
        let parts = parts_with_auth(&format!("Bearer {token}"));
        assert_eq!(bearer_token(&parts), Some(token));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        let parts = parts_with_auth("Basic dXNlcjpwYXNz");
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_bearer_token_rejects_garbage() {
        let parts = parts_with_auth("Bearer not-a-uuid");
        assert_eq!(bearer_token(&parts), None);
    }
}
