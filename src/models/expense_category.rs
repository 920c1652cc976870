use serde::Serialize;

#[derive(sqlx::FromRow, Serialize)]
pub struct ExpenseCategory {
    pub id: i64,
    pub name: String,
    /// CAFE, BOOKSHOP, FOODHUT or COMMON
    pub shop_type: String,
}
