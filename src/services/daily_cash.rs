use chrono::NaiveDate;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::daily_cash::DailyCash;

const DAILY_CASH_COLUMNS: &str =
    "id, shop_id, business_date, opening_cash, opening_confirmed, closing_cash, locked, closed_by, closed_at";

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<DailyCash, AppError> {
    let sql = format!("SELECT {DAILY_CASH_COLUMNS} FROM daily_cash WHERE id = $1");
    sqlx::query_as::<_, DailyCash>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("Daily cash record not found"))
}

pub async fn find_by_shop_and_date(
    pool: &PgPool,
    shop_id: i64,
    date: NaiveDate,
) -> Result<Option<DailyCash>, AppError> {
    let sql = format!(
        "SELECT {DAILY_CASH_COLUMNS} FROM daily_cash WHERE shop_id = $1 AND business_date = $2"
    );
    Ok(sqlx::query_as::<_, DailyCash>(&sql)
        .bind(shop_id)
        .bind(date)
        .fetch_optional(pool)
        .await?)
}

/// Get the daily cash record for (shop, date), creating it on first access.
///
/// A new record seeds its opening cash from the chronologically nearest
/// earlier record's closing cash for the same shop (0.0 when there is none or
/// its closing cash is null) and starts unconfirmed and unlocked.
///
/// Concurrent first access for the same (shop, date) is resolved by the unique
/// constraint: the insert uses ON CONFLICT DO NOTHING and the loser of the
/// race re-reads the row the winner created, so all callers observe one record.
pub async fn get_or_create(
    pool: &PgPool,
    shop_id: i64,
    date: NaiveDate,
) -> Result<DailyCash, AppError> {
    if let Some(existing) = find_by_shop_and_date(pool, shop_id, date).await? {
        return Ok(existing);
    }

    let shop_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM shops WHERE id = $1)")
            .bind(shop_id)
            .fetch_one(pool)
            .await?;
    if !shop_exists {
        return Err(AppError::not_found("Shop not found"));
    }

    let previous_closing: Option<Option<f64>> = sqlx::query_scalar(
        r#"SELECT closing_cash FROM daily_cash
           WHERE shop_id = $1 AND business_date < $2
           ORDER BY business_date DESC
           LIMIT 1"#,
    )
    .bind(shop_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    let opening_cash = seed_opening_cash(previous_closing);

    let insert_sql = format!(
        r#"INSERT INTO daily_cash (shop_id, business_date, opening_cash, opening_confirmed, locked)
           VALUES ($1, $2, $3, FALSE, FALSE)
           ON CONFLICT (shop_id, business_date) DO NOTHING
           RETURNING {DAILY_CASH_COLUMNS}"#
    );
    let inserted = sqlx::query_as::<_, DailyCash>(&insert_sql)
        .bind(shop_id)
        .bind(date)
        .bind(opening_cash)
        .fetch_optional(pool)
        .await?;

    match inserted {
        Some(created) => {
            tracing::info!(
                daily_cash_id = created.id,
                shop_id,
                business_date = %date,
                opening_cash,
                "Created daily cash record"
            );
            Ok(created)
        }
        // Lost the first-access race; the winner's row is there now.
        None => find_by_shop_and_date(pool, shop_id, date)
            .await?
            .ok_or_else(|| AppError::internal("Daily cash record vanished after conflict")),
    }
}

/// Opening balance carried forward from the previous record, if any.
fn seed_opening_cash(previous_closing: Option<Option<f64>>) -> f64 {
    previous_closing.flatten().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::seed_opening_cash;

    #[test]
    fn seeds_zero_when_no_previous_record() {
        assert_eq!(seed_opening_cash(None), 0.0);
    }

    #[test]
    fn seeds_zero_when_previous_record_never_closed() {
        assert_eq!(seed_opening_cash(Some(None)), 0.0);
    }

    #[test]
    fn carries_previous_closing_balance() {
        assert_eq!(seed_opening_cash(Some(Some(130.0))), 130.0);
    }
}
