use serde::Serialize;

#[derive(sqlx::FromRow, Serialize)]
pub struct Shop {
    pub id: i64,
    pub code: String,
    pub name: String,
}
