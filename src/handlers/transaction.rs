use axum::{extract::{State, Path}, Json, Extension};
use serde_json::json;
use sqlx::PgPool;

use crate::state::AppState;
use crate::error::AppError;
use crate::dtos::transaction::{TransactionDetailResponse, UpdateTransactionRequest};
use crate::middleware::auth::AuthContext;
use crate::services::{audit, daily_cash, summary, validate};

/// Transaction detail for the admin edit screen.
pub async fn get_transaction(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<TransactionDetailResponse>, AppError> {
    if !auth.is_superadmin() {
        return Err(AppError::forbidden("Only superadmins can view transaction details"));
    }
    fetch_detail(&db_pool, id).await.map(Json)
}

/// Superadmin correction of a ledger entry. When the owning day is locked the
/// cached summary is recomputed in the same operation, so a correction can
/// never leave the cache diverged from the ledger.
pub async fn update_transaction(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTransactionRequest>,
) -> Result<Json<TransactionDetailResponse>, AppError> {
    if !auth.is_superadmin() {
        return Err(AppError::forbidden("Only superadmins can edit transactions"));
    }

    let entry = find_entry(&db_pool, id).await?;

    if let Some(amount) = req.amount {
        validate::positive_amount(Some(amount), "amount")?;
    }
    // Unlike at creation, an explicit category on an edit must resolve.
    if let Some(category_id) = req.expense_category_id {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM expense_categories WHERE id = $1)",
        )
        .bind(category_id)
        .fetch_one(&db_pool)
        .await?;
        if !exists {
            return Err(AppError::not_found("Expense category not found"));
        }
    }

    let old_values = json!({
        "amount": entry.amount,
        "description": entry.description,
        "expenseCategoryId": entry.expense_category_id,
    });

    let updated = sqlx::query_as::<_, EntryRow>(
        r#"UPDATE cash_transactions SET
             amount = COALESCE($2, amount),
             description = COALESCE($3, description),
             expense_category_id = COALESCE($4, expense_category_id)
           WHERE id = $1
           RETURNING id, daily_cash_id, entry_type, amount, expense_category_id, description"#,
    )
    .bind(id)
    .bind(req.amount)
    .bind(&req.description)
    .bind(req.expense_category_id)
    .fetch_one(&db_pool)
    .await?;

    audit::record(
        &db_pool,
        auth.user_id,
        "EDIT",
        "CASH_TRANSACTION",
        id,
        Some(old_values),
        Some(json!({
            "amount": updated.amount,
            "description": updated.description,
            "expenseCategoryId": updated.expense_category_id,
        })),
    )
    .await;

    let owner = daily_cash::find_by_id(&db_pool, entry.daily_cash_id).await?;
    summary::recalculate_if_locked(&db_pool, &owner).await;

    fetch_detail(&db_pool, id).await.map(Json)
}

/// Superadmin delete of a ledger entry, with the same recompute guarantee as
/// an edit.
pub async fn delete_transaction(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !auth.is_superadmin() {
        return Err(AppError::forbidden("Only superadmins can delete transactions"));
    }

    let entry = find_entry(&db_pool, id).await?;
    let owner = daily_cash::find_by_id(&db_pool, entry.daily_cash_id).await?;

    audit::record(
        &db_pool,
        auth.user_id,
        "DELETE",
        "CASH_TRANSACTION",
        id,
        Some(json!({
            "dailyCashId": entry.daily_cash_id,
            "type": entry.entry_type,
            "amount": entry.amount,
            "description": entry.description,
            "expenseCategoryId": entry.expense_category_id,
        })),
        None,
    )
    .await;

    sqlx::query("DELETE FROM cash_transactions WHERE id = $1")
        .bind(id)
        .execute(&db_pool)
        .await?;

    summary::recalculate_if_locked(&db_pool, &owner).await;

    Ok(Json(json!({
        "message": "Transaction deleted",
        "note": "Daily summary has been recalculated",
    })))
}

// ==================== Helper Functions ====================

async fn find_entry(pool: &PgPool, id: i64) -> Result<EntryRow, AppError> {
    sqlx::query_as::<_, EntryRow>(
        r#"SELECT id, daily_cash_id, entry_type, amount, expense_category_id, description
           FROM cash_transactions WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("Transaction not found"))
}

async fn fetch_detail(pool: &PgPool, id: i64) -> Result<TransactionDetailResponse, AppError> {
    let row = sqlx::query_as::<_, DetailRow>(
        r#"SELECT ct.id, ct.daily_cash_id, ct.entry_type, ct.amount,
                  ct.expense_category_id, ec.name AS expense_category_name,
                  ct.description, u.name AS recorded_by_name, ct.created_at,
                  s.code AS shop_code, dc.business_date
           FROM cash_transactions ct
           JOIN daily_cash dc ON ct.daily_cash_id = dc.id
           JOIN shops s ON dc.shop_id = s.id
           LEFT JOIN expense_categories ec ON ct.expense_category_id = ec.id
           LEFT JOIN users u ON ct.recorded_by = u.id
           WHERE ct.id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("Transaction not found"))?;

    Ok(TransactionDetailResponse {
        id: row.id,
        daily_cash_id: row.daily_cash_id,
        entry_type: row.entry_type,
        amount: row.amount,
        expense_category_id: row.expense_category_id,
        expense_category_name: row.expense_category_name,
        description: row.description,
        recorded_by_name: row.recorded_by_name,
        created_at: row.created_at,
        shop_code: row.shop_code,
        business_date: row.business_date,
    })
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: i64,
    daily_cash_id: i64,
    entry_type: String,
    amount: f64,
    expense_category_id: Option<i64>,
    description: Option<String>,
}

#[derive(sqlx::FromRow)]
struct DetailRow {
    id: i64,
    daily_cash_id: i64,
    entry_type: String,
    amount: f64,
    expense_category_id: Option<i64>,
    expense_category_name: Option<String>,
    description: Option<String>,
    recorded_by_name: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    shop_code: String,
    business_date: chrono::NaiveDate,
}
