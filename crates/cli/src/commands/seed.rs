//! Database seeding commands.

use bagworks_core::Money;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use super::{CommandError, connect};

/// Seed the example coupons.
///
/// `SAVE10` (10% off) and `FLAT100` (flat ₹100 off) are ordinary
/// data-driven rows, nothing in the engine special-cases them. Existing
/// codes are left untouched.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn coupons() -> Result<(), CommandError> {
    let pool = connect("DATABASE_URL").await?;

    let valid_from = Utc::now();
    let valid_till = valid_from + Duration::days(365);

    let min_cart = Money::from_rupees_i64(200);
    let seeds = [
        ("SAVE10", "percentage", Decimal::new(10, 0), min_cart),
        ("FLAT100", "flat", Decimal::new(100, 0), min_cart),
    ];

    for (code, kind, value, min_cart_value) in seeds {
        let result = sqlx::query(
            r"
            INSERT INTO shop.coupons
                (code, kind, value, min_cart_value, valid_from, valid_till)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (code) DO NOTHING
            ",
        )
        .bind(code)
        .bind(kind)
        .bind(value)
        .bind(min_cart_value)
        .bind(valid_from)
        .bind(valid_till)
        .execute(&pool)
        .await?;

        if result.rows_affected() == 1 {
            tracing::info!(code, "Coupon seeded");
        } else {
            tracing::info!(code, "Coupon already present, skipped");
        }
    }

    println!("seeded {} coupons", seeds.len());
    Ok(())
}
