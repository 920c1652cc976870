use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};

use crate::dtos::credit::CreditResponse;
use crate::dtos::transaction::TransactionView;

// Amounts are Option so a missing field surfaces as a named 400 instead of a
// bare deserialize rejection.

#[derive(Deserialize)]
pub struct AddEntryRequest {
    pub amount: Option<f64>,
    pub expense_category_id: Option<i64>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct CloseDayRequest {
    pub closing_cash: Option<f64>,
}

#[derive(Deserialize)]
pub struct OpeningBalanceRequest {
    pub opening_cash: Option<f64>,
}

/// Superadmin field-level correction of a daily cash record.
#[derive(Deserialize)]
pub struct UpdateDailyCashRequest {
    pub opening_cash: Option<f64>,
    pub closing_cash: Option<f64>,
    pub opening_confirmed: Option<bool>,
}

#[derive(Deserialize)]
pub struct LatestBalanceQuery {
    pub days_back: Option<i64>,
}

#[derive(Serialize)]
pub struct DailyCashResponse {
    pub id: i64,
    pub shop_id: i64,
    pub business_date: NaiveDate,
    pub opening_cash: f64,
    pub opening_confirmed: bool,
    pub closing_cash: Option<f64>,
    pub locked: bool,
    pub closed_by_name: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// The daily screen: record state, entry and credit lists, derived totals.
/// `total_sales`/`expected_closing`/`variance` are present only once the day
/// has a closing cash.
#[derive(Serialize)]
pub struct DailyCashSummaryResponse {
    pub daily_cash_id: i64,
    pub shop_id: i64,
    pub shop_code: String,
    pub shop_name: String,
    pub business_date: NaiveDate,
    pub opening_cash: f64,
    pub opening_confirmed: bool,
    pub closing_cash: Option<f64>,
    pub locked: bool,
    pub closed_by_name: Option<String>,
    pub total_expenses: f64,
    pub manual_sales: f64,
    pub total_credits: f64,
    pub total_sales: Option<f64>,
    pub expected_closing: Option<f64>,
    pub variance: Option<f64>,
    pub expenses: Vec<TransactionView>,
    pub sales: Vec<TransactionView>,
    pub credits: Vec<CreditResponse>,
}

#[derive(Serialize)]
pub struct LatestBalanceResponse {
    pub closing_cash: f64,
    pub business_date: Option<NaiveDate>,
    pub shop_id: i64,
}
