use axum::{extract::{State, Query}, Json, Extension};
use axum::http::StatusCode;
use crate::state::AppState;
use crate::error::AppError;
use crate::dtos::expense_category::{CreateExpenseCategoryRequest, ExpenseCategoryQuery};
use crate::middleware::auth::AuthContext;
use crate::models::expense_category::ExpenseCategory;

pub async fn list_categories(
    State(AppState { db_pool }): State<AppState>,
    Query(params): Query<ExpenseCategoryQuery>,
) -> Result<Json<Vec<ExpenseCategory>>, AppError> {
    let categories = match params.shop_type {
        Some(shop_type) => {
            sqlx::query_as::<_, ExpenseCategory>(
                r#"SELECT id, name, shop_type FROM expense_categories
                   WHERE shop_type = $1 OR shop_type = 'COMMON'
                   ORDER BY name ASC"#,
            )
            .bind(shop_type.to_uppercase())
            .fetch_all(&db_pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, ExpenseCategory>(
                "SELECT id, name, shop_type FROM expense_categories ORDER BY name ASC",
            )
            .fetch_all(&db_pool)
            .await?
        }
    };

    Ok(Json(categories))
}

pub async fn create_category(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateExpenseCategoryRequest>,
) -> Result<(StatusCode, Json<ExpenseCategory>), AppError> {
    if !auth.is_superadmin() {
        return Err(AppError::forbidden("Only superadmins can create expense categories"));
    }
    if req.name.trim().is_empty() {
        return Err(AppError::validation("Category name is required"));
    }

    let shop_type = req
        .shop_type
        .as_deref()
        .map(|s| s.trim().to_uppercase())
        .unwrap_or_else(|| "COMMON".to_string());

    let category = sqlx::query_as::<_, ExpenseCategory>(
        r#"INSERT INTO expense_categories (name, shop_type)
           VALUES ($1, $2)
           RETURNING id, name, shop_type"#,
    )
    .bind(req.name.trim())
    .bind(shop_type)
    .fetch_one(&db_pool)
    .await?;

    Ok((StatusCode::CREATED, Json(category)))
}
