use chrono::NaiveDate;
use serde::Serialize;

/// Cached reconciliation outputs for one closed day, keyed by
/// (shop_id, business_date). Purely derived from the daily cash record, its
/// ledger entries, the credits on that shop+date and attendance on the date;
/// always safe to discard and recompute. `closed_at` and `calculated_at` are
/// epoch milliseconds.
#[derive(sqlx::FromRow, Serialize)]
pub struct DailySummary {
    pub id: i64,
    pub shop_id: i64,
    pub business_date: NaiveDate,
    pub opening_cash: f64,
    pub closing_cash: Option<f64>,
    pub cash_difference: f64,
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub total_credits: f64,
    pub net_sales: f64,
    pub profit: f64,
    pub total_sales: f64,
    pub expected_closing: f64,
    pub variance: f64,
    pub expense_count: i32,
    pub credit_count: i32,
    pub manual_sale_count: i32,
    pub staff_count: i32,
    pub total_attendance_hours: f64,
    pub is_closed: bool,
    pub closed_by_id: Option<i64>,
    pub closed_at: Option<i64>,
    pub calculated_at: i64,
}
