use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};

#[derive(Deserialize)]
pub struct CreateCreditRequest {
    pub user_id: Option<i64>,
    pub amount: Option<f64>,
    pub reason: Option<String>,
    pub shop_id: Option<i64>,
    pub department: Option<String>,
    pub transaction_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct UpdateCreditRequest {
    pub user_id: Option<i64>,
    pub amount: Option<f64>,
    pub reason: Option<String>,
    pub is_paid: Option<bool>,
    pub shop_id: Option<i64>,
    pub department: Option<String>,
    pub transaction_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct PaidStatusRequest {
    pub is_paid: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreditFilterQuery {
    pub is_paid: Option<bool>,
}

#[derive(Serialize)]
pub struct CreditResponse {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub shop_id: Option<i64>,
    pub shop_name: Option<String>,
    pub department: String,
    pub amount: f64,
    pub reason: Option<String>,
    pub is_paid: bool,
    pub transaction_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct UnpaidSummaryEntry {
    pub user_id: i64,
    pub user_name: String,
    pub total_unpaid: f64,
}

#[derive(Serialize)]
pub struct OutstandingTotalResponse {
    pub total_unpaid: f64,
    pub unpaid_count: i64,
}
