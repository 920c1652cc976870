use serde::{Deserialize, Serialize};
use chrono::NaiveDate;

#[derive(Deserialize)]
pub struct SummaryRangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub shop_id: Option<i64>,
}

#[derive(Serialize)]
pub struct RecalculateRangeResponse {
    pub count: i64,
}
