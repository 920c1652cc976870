use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateExpenseCategoryRequest {
    pub name: String,
    pub shop_type: Option<String>,
}

#[derive(Deserialize)]
pub struct ExpenseCategoryQuery {
    pub shop_type: Option<String>,
}
