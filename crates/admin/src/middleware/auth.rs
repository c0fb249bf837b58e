//! Staff authentication extractors.
//!
//! Staff bearer tokens are minted by the CLI and validated against
//! `backoffice.staff_tokens`. [`RequireStaff`] admits any role;
//! [`RequireStaffWrite`] additionally rejects read-only viewers, so write
//! handlers state their requirement in the signature.

use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use bagworks_core::StaffId;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::StaffRole;
use crate::state::AppState;

/// The authenticated staff member.
#[derive(Debug, Clone)]
pub struct StaffContext {
    pub id: StaffId,
    pub name: String,
    pub role: StaffRole,
}

impl StaffContext {
    /// The actor string recorded in status history and notes.
    #[must_use]
    pub fn actor(&self) -> String {
        format!("staff:{}", self.id)
    }
}

/// Extractor that requires any authenticated staff member.
pub struct RequireStaff(pub StaffContext);

/// Extractor that requires a staff member with write access.
pub struct RequireStaffWrite(pub StaffContext);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_owned()))?;

        let row: Option<(StaffId, String, String)> = sqlx::query_as(
            r"
            SELECT s.id, s.name, s.role
            FROM backoffice.staff_tokens t
            JOIN backoffice.staff s ON s.id = t.staff_id
            WHERE t.token = $1 AND t.expires_at > NOW()
            ",
        )
        .bind(token)
        .fetch_optional(state.pool())
        .await
        .map_err(crate::db::RepositoryError::from)?;

        let (id, name, role) =
            row.ok_or_else(|| AppError::Unauthorized("invalid or expired token".to_owned()))?;
        let role: StaffRole = role.parse().map_err(|e: String| {
            AppError::Repository(crate::db::RepositoryError::DataCorruption(format!(
                "invalid staff role in database: {e}"
            )))
        })?;

        Ok(Self(StaffContext { id, name, role }))
    }
}

impl FromRequestParts<AppState> for RequireStaffWrite {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireStaff(staff) = RequireStaff::from_request_parts(parts, state).await?;
        if !staff.role.can_write() {
            return Err(AppError::Forbidden(
                "this operation requires the admin role".to_owned(),
            ));
        }
        Ok(Self(staff))
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
    use bagworks_core::StaffId;

    use super::*;

    #[test]
    fn test_actor_string() {
        let staff = StaffContext {
            id: StaffId::new(7),
            name: "Meera".to_owned(),
            role: StaffRole::Admin,
        };
        assert_eq!(staff.actor(), "staff:7");
    }
}
