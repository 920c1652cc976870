use chrono::{NaiveDate, Utc};
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::daily_cash::DailyCash;
use crate::models::daily_summary::DailySummary;

/// Everything the reconciliation formula consumes for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationInputs {
    pub opening_cash: f64,
    pub closing_cash: Option<f64>,
    pub total_expenses: f64,
    pub manual_sales: f64,
    pub total_credits: f64,
}

/// Derived reconciliation outputs. The formula is fixed: sign conventions are
/// part of the contract and reported profit changes if any term moves.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationFigures {
    pub cash_difference: f64,
    pub total_sales: f64,
    pub total_revenue: f64,
    pub net_sales: f64,
    pub profit: f64,
    pub expected_closing: f64,
    pub variance: f64,
}

impl ReconciliationFigures {
    pub fn compute(i: &ReconciliationInputs) -> Self {
        let cash_difference = i.closing_cash.map_or(0.0, |c| c - i.opening_cash);
        // Total sales volume, cash plus credit-based.
        let total_sales =
            cash_difference + i.total_expenses + i.total_credits - i.manual_sales;
        // Cash-register-only revenue, used for profit.
        let total_revenue = cash_difference + i.total_expenses;
        let net_sales = total_revenue - i.total_credits;
        let profit = total_revenue - i.total_expenses;
        let expected_closing = i.opening_cash + total_sales - i.total_expenses
            - i.total_credits
            + i.manual_sales;
        // Signed: positive = cash surplus, negative = shortfall.
        let variance = i.closing_cash.unwrap_or(0.0) - expected_closing;

        Self {
            cash_difference,
            total_sales,
            total_revenue,
            net_sales,
            profit,
            expected_closing,
            variance,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LedgerTotals {
    total_expenses: f64,
    manual_sales: f64,
    expense_count: i64,
    manual_sale_count: i64,
}

#[derive(sqlx::FromRow)]
struct CreditTotals {
    total_credits: f64,
    credit_count: i64,
}

#[derive(sqlx::FromRow)]
struct AttendanceTotals {
    staff_count: i64,
    working_count: i64,
}

const HOURS_PER_WORKED_DAY: f64 = 8.0;

const SUMMARY_COLUMNS: &str = "id, shop_id, business_date, opening_cash, closing_cash, \
     cash_difference, total_revenue, total_expenses, total_credits, net_sales, profit, \
     total_sales, expected_closing, variance, expense_count, credit_count, \
     manual_sale_count, staff_count, total_attendance_hours, is_closed, closed_by_id, \
     closed_at, calculated_at";

/// Recompute the cached summary for one day from the current ledger, credit
/// and attendance state, updating the existing row in place when one exists.
/// Idempotent apart from `calculated_at`.
pub async fn calculate_and_save(
    pool: &PgPool,
    daily_cash: &DailyCash,
) -> Result<DailySummary, AppError> {
    let ledger = sqlx::query_as::<_, LedgerTotals>(
        r#"SELECT
            COALESCE(SUM(amount) FILTER (WHERE entry_type = 'EXPENSE'), 0)::FLOAT8 AS total_expenses,
            COALESCE(SUM(amount) FILTER (WHERE entry_type = 'SALE'), 0)::FLOAT8 AS manual_sales,
            COUNT(*) FILTER (WHERE entry_type = 'EXPENSE') AS expense_count,
            COUNT(*) FILTER (WHERE entry_type = 'SALE') AS manual_sale_count
           FROM cash_transactions
           WHERE daily_cash_id = $1"#,
    )
    .bind(daily_cash.id)
    .fetch_one(pool)
    .await?;

    // Credits are linked by shop reference only; the legacy department string
    // is never a query key.
    let credits = sqlx::query_as::<_, CreditTotals>(
        r#"SELECT
            COALESCE(SUM(amount), 0)::FLOAT8 AS total_credits,
            COUNT(*) AS credit_count
           FROM credits
           WHERE shop_id = $1 AND transaction_date = $2"#,
    )
    .bind(daily_cash.shop_id)
    .bind(daily_cash.business_date)
    .fetch_one(pool)
    .await?;

    let attendance = sqlx::query_as::<_, AttendanceTotals>(
        r#"SELECT
            COUNT(*) AS staff_count,
            COUNT(*) FILTER (WHERE is_working) AS working_count
           FROM attendance
           WHERE work_date = $1"#,
    )
    .bind(daily_cash.business_date)
    .fetch_one(pool)
    .await?;

    let figures = ReconciliationFigures::compute(&ReconciliationInputs {
        opening_cash: daily_cash.opening_cash,
        closing_cash: daily_cash.closing_cash,
        total_expenses: ledger.total_expenses,
        manual_sales: ledger.manual_sales,
        total_credits: credits.total_credits,
    });

    let total_attendance_hours = HOURS_PER_WORKED_DAY * attendance.working_count as f64;
    let calculated_at = Utc::now().timestamp_millis();
    let closed_at_millis = daily_cash.closed_at.map(|t| t.timestamp_millis());

    let upsert_sql = format!(
        r#"INSERT INTO daily_summaries
            (shop_id, business_date, opening_cash, closing_cash, cash_difference,
             total_revenue, total_expenses, total_credits, net_sales, profit,
             total_sales, expected_closing, variance, expense_count, credit_count,
             manual_sale_count, staff_count, total_attendance_hours, is_closed,
             closed_by_id, closed_at, calculated_at)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                   $15, $16, $17, $18, $19, $20, $21, $22)
           ON CONFLICT (shop_id, business_date) DO UPDATE SET
             opening_cash = EXCLUDED.opening_cash,
             closing_cash = EXCLUDED.closing_cash,
             cash_difference = EXCLUDED.cash_difference,
             total_revenue = EXCLUDED.total_revenue,
             total_expenses = EXCLUDED.total_expenses,
             total_credits = EXCLUDED.total_credits,
             net_sales = EXCLUDED.net_sales,
             profit = EXCLUDED.profit,
             total_sales = EXCLUDED.total_sales,
             expected_closing = EXCLUDED.expected_closing,
             variance = EXCLUDED.variance,
             expense_count = EXCLUDED.expense_count,
             credit_count = EXCLUDED.credit_count,
             manual_sale_count = EXCLUDED.manual_sale_count,
             staff_count = EXCLUDED.staff_count,
             total_attendance_hours = EXCLUDED.total_attendance_hours,
             is_closed = EXCLUDED.is_closed,
             closed_by_id = EXCLUDED.closed_by_id,
             closed_at = EXCLUDED.closed_at,
             calculated_at = EXCLUDED.calculated_at
           RETURNING {SUMMARY_COLUMNS}"#
    );

    let summary = sqlx::query_as::<_, DailySummary>(&upsert_sql)
        .bind(daily_cash.shop_id)
        .bind(daily_cash.business_date)
        .bind(daily_cash.opening_cash)
        .bind(daily_cash.closing_cash)
        .bind(figures.cash_difference)
        .bind(figures.total_revenue)
        .bind(ledger.total_expenses)
        .bind(credits.total_credits)
        .bind(figures.net_sales)
        .bind(figures.profit)
        .bind(figures.total_sales)
        .bind(figures.expected_closing)
        .bind(figures.variance)
        .bind(ledger.expense_count as i32)
        .bind(credits.credit_count as i32)
        .bind(ledger.manual_sale_count as i32)
        .bind(attendance.staff_count as i32)
        .bind(total_attendance_hours)
        .bind(daily_cash.locked)
        .bind(daily_cash.closed_by)
        .bind(closed_at_millis)
        .bind(calculated_at)
        .fetch_one(pool)
        .await?;

    tracing::info!(
        shop_id = daily_cash.shop_id,
        business_date = %daily_cash.business_date,
        profit = figures.profit,
        "Daily summary recalculated"
    );

    Ok(summary)
}

/// Best-effort recompute after a mutation touching a closed day. The ledger is
/// authoritative and the cache is disposable, so a recompute failure must not
/// abort the triggering mutation; it is logged and the cache stays stale until
/// the next trigger or explicit recalculation.
pub async fn recalculate_if_locked(pool: &PgPool, daily_cash: &DailyCash) {
    if !daily_cash.locked {
        return;
    }
    if let Err(e) = calculate_and_save(pool, daily_cash).await {
        tracing::error!(
            daily_cash_id = daily_cash.id,
            error = ?e,
            "Failed to recalculate daily summary"
        );
    }
}

pub async fn recalculate_for_day(
    pool: &PgPool,
    daily_cash_id: i64,
) -> Result<DailySummary, AppError> {
    let daily_cash = super::daily_cash::find_by_id(pool, daily_cash_id).await?;
    calculate_and_save(pool, &daily_cash).await
}

/// Recompute every locked day in the range. Backfill/correction driver; loads
/// all matching rows at once, which is acceptable at the volumes this system
/// targets.
pub async fn recalculate_range(
    pool: &PgPool,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<i64, AppError> {
    let records = sqlx::query_as::<_, DailyCash>(
        r#"SELECT id, shop_id, business_date, opening_cash, opening_confirmed,
                  closing_cash, locked, closed_by, closed_at
           FROM daily_cash
           WHERE business_date BETWEEN $1 AND $2 AND locked = TRUE
           ORDER BY business_date, shop_id"#,
    )
    .bind(start_date)
    .bind(end_date)
    .fetch_all(pool)
    .await?;

    let mut count = 0i64;
    for record in &records {
        calculate_and_save(pool, record).await?;
        count += 1;
    }

    tracing::info!(%start_date, %end_date, count, "Recalculated summaries for range");
    Ok(count)
}

pub async fn get_summary(
    pool: &PgPool,
    shop_id: i64,
    business_date: NaiveDate,
) -> Result<Option<DailySummary>, AppError> {
    let sql = format!(
        "SELECT {SUMMARY_COLUMNS} FROM daily_summaries WHERE shop_id = $1 AND business_date = $2"
    );
    Ok(sqlx::query_as::<_, DailySummary>(&sql)
        .bind(shop_id)
        .bind(business_date)
        .fetch_optional(pool)
        .await?)
}

pub async fn list_summaries(
    pool: &PgPool,
    start_date: NaiveDate,
    end_date: NaiveDate,
    shop_id: Option<i64>,
) -> Result<Vec<DailySummary>, AppError> {
    let summaries = match shop_id {
        Some(shop_id) => {
            let sql = format!(
                "SELECT {SUMMARY_COLUMNS} FROM daily_summaries \
                 WHERE shop_id = $1 AND business_date BETWEEN $2 AND $3 \
                 ORDER BY business_date"
            );
            sqlx::query_as::<_, DailySummary>(&sql)
                .bind(shop_id)
                .bind(start_date)
                .bind(end_date)
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!(
                "SELECT {SUMMARY_COLUMNS} FROM daily_summaries \
                 WHERE business_date BETWEEN $1 AND $2 \
                 ORDER BY business_date, shop_id"
            );
            sqlx::query_as::<_, DailySummary>(&sql)
                .bind(start_date)
                .bind(end_date)
                .fetch_all(pool)
                .await?
        }
    };
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(
        opening: f64,
        closing: Option<f64>,
        expenses: f64,
        manual: f64,
        credits: f64,
    ) -> ReconciliationInputs {
        ReconciliationInputs {
            opening_cash: opening,
            closing_cash: closing,
            total_expenses: expenses,
            manual_sales: manual,
            total_credits: credits,
        }
    }

    #[test]
    fn formula_matches_canonical_example() {
        // opening 100, closing 500, expenses 50+30, manual sale 20, credit 40
        let f = ReconciliationFigures::compute(&inputs(100.0, Some(500.0), 80.0, 20.0, 40.0));
        assert_eq!(f.cash_difference, 400.0);
        assert_eq!(f.total_sales, 500.0);
        assert_eq!(f.total_revenue, 480.0);
        assert_eq!(f.net_sales, 440.0);
        assert_eq!(f.profit, 400.0);
        assert_eq!(f.expected_closing, 500.0);
        assert_eq!(f.variance, 0.0);
    }

    #[test]
    fn first_trading_day_scenario() {
        // opening 0, expense 50, manual sale 20, no credits, closed at 130
        let f = ReconciliationFigures::compute(&inputs(0.0, Some(130.0), 50.0, 20.0, 0.0));
        assert_eq!(f.total_sales, 160.0);
        assert_eq!(f.total_revenue, 180.0);
        assert_eq!(f.profit, 130.0);
        assert_eq!(f.variance, 0.0);
    }

    #[test]
    fn open_day_has_zero_cash_difference() {
        let f = ReconciliationFigures::compute(&inputs(200.0, None, 75.0, 10.0, 25.0));
        assert_eq!(f.cash_difference, 0.0);
        assert_eq!(f.total_revenue, 75.0);
        assert_eq!(f.profit, 0.0);
        assert_eq!(f.total_sales, 90.0);
    }

    #[test]
    fn closed_day_variance_is_zero_under_final_formula() {
        // expected_closing reduces to the actual closing whenever all terms
        // come from the same ledger state, so a closed day reconciles to zero.
        for (opening, closing, expenses, manual, credits) in [
            (100.0, 540.0, 80.0, 20.0, 40.0),
            (0.0, 130.0, 50.0, 20.0, 0.0),
            (310.5, 275.25, 12.0, 99.0, 7.5),
        ] {
            let f = ReconciliationFigures::compute(&inputs(
                opening,
                Some(closing),
                expenses,
                manual,
                credits,
            ));
            assert_eq!(f.expected_closing, closing);
            assert_eq!(f.variance, 0.0);
        }
    }

    #[test]
    fn recomputation_is_idempotent() {
        let i = inputs(250.0, Some(900.0), 120.5, 60.25, 33.75);
        let first = ReconciliationFigures::compute(&i);
        let second = ReconciliationFigures::compute(&i);
        assert_eq!(first, second);
    }

    #[test]
    fn credits_increase_total_sales_but_not_revenue() {
        let without = ReconciliationFigures::compute(&inputs(0.0, Some(100.0), 0.0, 0.0, 0.0));
        let with = ReconciliationFigures::compute(&inputs(0.0, Some(100.0), 0.0, 0.0, 50.0));
        assert_eq!(with.total_sales, without.total_sales + 50.0);
        assert_eq!(with.total_revenue, without.total_revenue);
        assert_eq!(with.net_sales, without.net_sales - 50.0);
    }
}
