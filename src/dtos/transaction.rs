use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};

#[derive(Serialize)]
pub struct EntryCreatedResponse {
    pub id: i64,
}

/// Ledger entry as shown inside the daily cash summary lists.
#[derive(Serialize)]
pub struct TransactionView {
    pub id: i64,
    pub entry_type: String,
    pub amount: f64,
    pub expense_category_id: Option<i64>,
    pub expense_category_name: Option<String>,
    pub description: Option<String>,
    pub recorded_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct UpdateTransactionRequest {
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub expense_category_id: Option<i64>,
}

/// Full detail used by the admin edit screen, including the owning day's
/// shop and business date.
#[derive(Serialize)]
pub struct TransactionDetailResponse {
    pub id: i64,
    pub daily_cash_id: i64,
    pub entry_type: String,
    pub amount: f64,
    pub expense_category_id: Option<i64>,
    pub expense_category_name: Option<String>,
    pub description: Option<String>,
    pub recorded_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub shop_code: String,
    pub business_date: NaiveDate,
}
