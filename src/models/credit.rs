use chrono::{DateTime, NaiveDate, Utc};

/// A customer credit (informal IOU) granted by a staff member, scoped to a
/// shop and business date. Consumed by the reconciliation calculator but not
/// owned by any daily cash record. `department` is a legacy identifier kept
/// for migrated rows; reconciliation queries go through `shop_id` only.
#[derive(sqlx::FromRow)]
pub struct Credit {
    pub id: i64,
    pub user_id: i64,
    pub shop_id: Option<i64>,
    pub department: String,
    pub amount: f64,
    pub reason: Option<String>,
    pub is_paid: bool,
    pub transaction_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}
