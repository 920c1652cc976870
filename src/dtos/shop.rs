use serde::{Deserialize, Serialize};
use chrono::NaiveDate;

#[derive(Deserialize)]
pub struct CreateShopRequest {
    pub code: String,
    pub name: String,
}

#[derive(Serialize)]
pub struct ShopResponse {
    pub id: i64,
    pub code: String,
    pub name: String,
}

/// Main-menu view: each shop with its most recent closing balance.
#[derive(Serialize)]
pub struct ShopCashSummary {
    pub shop_id: i64,
    pub shop_code: String,
    pub shop_name: String,
    pub latest_closing_cash: Option<f64>,
    pub last_updated_date: Option<NaiveDate>,
}
