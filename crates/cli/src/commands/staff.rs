//! Staff management commands.

use bagworks_admin::models::StaffRole;
use chrono::{Duration, Utc};
use uuid::Uuid;

use super::{CommandError, connect};

/// Create (or update) a staff member and mint a bearer token.
///
/// The token is printed once and stored only as a row in
/// `backoffice.staff_tokens`; there is nothing to recover later, mint a
/// new one instead.
///
/// # Errors
///
/// Returns an error for an unknown role or a database failure.
pub async fn create(email: &str, name: &str, role: &str, days: i64) -> Result<(), CommandError> {
    let role: StaffRole = role
        .parse()
        .map_err(|e: String| CommandError::InvalidArgument(e))?;
    if days <= 0 {
        return Err(CommandError::InvalidArgument(
            "token validity must be at least 1 day".to_owned(),
        ));
    }

    let pool = connect("ADMIN_DATABASE_URL").await?;

    let (staff_id,): (i64,) = sqlx::query_as(
        r"
        INSERT INTO backoffice.staff (email, name, role)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE SET name = $2, role = $3
        RETURNING id
        ",
    )
    .bind(email)
    .bind(name)
    .bind(role.to_string())
    .fetch_one(&pool)
    .await?;

    let token = Uuid::new_v4();
    let expires_at = Utc::now() + Duration::days(days);

    sqlx::query(
        r"
        INSERT INTO backoffice.staff_tokens (token, staff_id, expires_at)
        VALUES ($1, $2, $3)
        ",
    )
    .bind(token)
    .bind(staff_id)
    .bind(expires_at)
    .execute(&pool)
    .await?;

    tracing::info!(staff_id, email, %role, "Staff member ready");
    println!("staff id:  {staff_id}");
    println!("token:     {token}");
    println!("expires:   {expires_at}");
    Ok(())
}
