use axum::{extract::{State, Path, Query}, Json, Extension};
use axum::http::StatusCode;
use chrono::{NaiveDate, Utc};
use serde_json::json;
use sqlx::PgPool;

use crate::state::AppState;
use crate::error::AppError;
use crate::dtos::credit::*;
use crate::middleware::auth::AuthContext;
use crate::models::credit::Credit;
use crate::services::{audit, daily_cash, summary, validate};

pub async fn list_credits(
    State(AppState { db_pool }): State<AppState>,
) -> Result<Json<Vec<CreditResponse>>, AppError> {
    let rows = sqlx::query_as::<_, CreditRow>(&credit_select("ORDER BY c.created_at DESC"))
        .fetch_all(&db_pool)
        .await?;
    Ok(Json(rows.into_iter().map(CreditRow::into_response).collect()))
}

pub async fn filter_credits(
    State(AppState { db_pool }): State<AppState>,
    Query(params): Query<CreditFilterQuery>,
) -> Result<Json<Vec<CreditResponse>>, AppError> {
    let rows = match params.is_paid {
        Some(is_paid) => {
            sqlx::query_as::<_, CreditRow>(&credit_select(
                "WHERE c.is_paid = $1 ORDER BY c.created_at DESC",
            ))
            .bind(is_paid)
            .fetch_all(&db_pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, CreditRow>(&credit_select("ORDER BY c.created_at DESC"))
                .fetch_all(&db_pool)
                .await?
        }
    };
    Ok(Json(rows.into_iter().map(CreditRow::into_response).collect()))
}

pub async fn create_credit(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateCreditRequest>,
) -> Result<(StatusCode, Json<CreditResponse>), AppError> {
    let user_id = req
        .user_id
        .ok_or_else(|| AppError::validation("user_id is required"))?;
    let amount = validate::positive_amount(req.amount, "amount")?;

    let user_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&db_pool)
            .await?;
    if !user_exists {
        return Err(AppError::not_found("User not found"));
    }

    if let Some(shop_id) = req.shop_id {
        let shop_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM shops WHERE id = $1)")
                .bind(shop_id)
                .fetch_one(&db_pool)
                .await?;
        if !shop_exists {
            return Err(AppError::not_found("Shop not found"));
        }
    }

    let department = req.department.unwrap_or_else(|| "COMMON".to_string());
    let transaction_date = req
        .transaction_date
        .unwrap_or_else(|| Utc::now().date_naive());

    let credit = sqlx::query_as::<_, Credit>(
        r#"INSERT INTO credits (user_id, shop_id, department, amount, reason, transaction_date)
           VALUES ($1, $2, $3, $4, $5, $6)
           RETURNING id, user_id, shop_id, department, amount, reason, is_paid,
                     transaction_date, created_at"#,
    )
    .bind(user_id)
    .bind(req.shop_id)
    .bind(&department)
    .bind(amount)
    .bind(&req.reason)
    .bind(transaction_date)
    .fetch_one(&db_pool)
    .await?;

    audit::record(
        &db_pool,
        auth.user_id,
        "CREATE",
        "CREDIT",
        credit.id,
        None,
        Some(json!({
            "userId": credit.user_id,
            "shopId": credit.shop_id,
            "department": credit.department,
            "amount": credit.amount,
            "reason": credit.reason,
            "transactionDate": credit.transaction_date,
        })),
    )
    .await;

    let row = fetch_credit_row(&db_pool, credit.id).await?;
    Ok((StatusCode::CREATED, Json(row.into_response())))
}

pub async fn update_paid_status(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(req): Json<PaidStatusRequest>,
) -> Result<Json<CreditResponse>, AppError> {
    let is_paid = req
        .is_paid
        .ok_or_else(|| AppError::validation("is_paid is required"))?;

    let credit = find_credit(&db_pool, id).await?;

    sqlx::query("UPDATE credits SET is_paid = $1 WHERE id = $2")
        .bind(is_paid)
        .bind(id)
        .execute(&db_pool)
        .await?;

    audit::record(
        &db_pool,
        auth.user_id,
        "UPDATE_PAID_STATUS",
        "CREDIT",
        id,
        Some(json!({ "isPaid": credit.is_paid })),
        Some(json!({ "isPaid": is_paid })),
    )
    .await;

    let row = fetch_credit_row(&db_pool, id).await?;
    Ok(Json(row.into_response()))
}

/// Outstanding credit per user, for the unpaid board.
pub async fn get_unpaid_summary(
    State(AppState { db_pool }): State<AppState>,
) -> Result<Json<Vec<UnpaidSummaryEntry>>, AppError> {
    let rows = sqlx::query_as::<_, UnpaidRow>(
        r#"SELECT c.user_id, u.name AS user_name, COALESCE(SUM(c.amount), 0)::FLOAT8 AS total_unpaid
           FROM credits c
           JOIN users u ON c.user_id = u.id
           WHERE c.is_paid = FALSE
           GROUP BY c.user_id, u.name
           ORDER BY total_unpaid DESC"#,
    )
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(
        rows.into_iter()
            .map(|r| UnpaidSummaryEntry {
                user_id: r.user_id,
                user_name: r.user_name,
                total_unpaid: r.total_unpaid,
            })
            .collect(),
    ))
}

pub async fn get_outstanding_total(
    State(AppState { db_pool }): State<AppState>,
) -> Result<Json<OutstandingTotalResponse>, AppError> {
    let row = sqlx::query_as::<_, OutstandingRow>(
        r#"SELECT COALESCE(SUM(amount), 0)::FLOAT8 AS total_unpaid, COUNT(*) AS unpaid_count
           FROM credits WHERE is_paid = FALSE"#,
    )
    .fetch_one(&db_pool)
    .await?;

    Ok(Json(OutstandingTotalResponse {
        total_unpaid: row.total_unpaid,
        unpaid_count: row.unpaid_count,
    }))
}

/// Superadmin correction of a credit. When the credit belongs to a closed
/// day (before or after the edit), the cached summary for that day is
/// recomputed so it never diverges from the ledger it was derived from.
pub async fn update_credit(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateCreditRequest>,
) -> Result<Json<CreditResponse>, AppError> {
    if !auth.is_superadmin() {
        return Err(AppError::forbidden("Only superadmins can edit credits"));
    }

    let credit = find_credit(&db_pool, id).await?;

    if let Some(user_id) = req.user_id {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&db_pool)
            .await?;
        if !exists {
            return Err(AppError::not_found("User not found"));
        }
    }
    if let Some(shop_id) = req.shop_id {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM shops WHERE id = $1)")
            .bind(shop_id)
            .fetch_one(&db_pool)
            .await?;
        if !exists {
            return Err(AppError::not_found("Shop not found"));
        }
    }
    if let Some(amount) = req.amount {
        validate::positive_amount(Some(amount), "amount")?;
    }

    let old_values = json!({
        "userId": credit.user_id,
        "shopId": credit.shop_id,
        "department": credit.department,
        "amount": credit.amount,
        "reason": credit.reason,
        "isPaid": credit.is_paid,
        "transactionDate": credit.transaction_date,
    });

    let updated = sqlx::query_as::<_, Credit>(
        r#"UPDATE credits SET
             user_id = COALESCE($2, user_id),
             shop_id = COALESCE($3, shop_id),
             department = COALESCE($4, department),
             amount = COALESCE($5, amount),
             reason = COALESCE($6, reason),
             is_paid = COALESCE($7, is_paid),
             transaction_date = COALESCE($8, transaction_date)
           WHERE id = $1
           RETURNING id, user_id, shop_id, department, amount, reason, is_paid,
                     transaction_date, created_at"#,
    )
    .bind(id)
    .bind(req.user_id)
    .bind(req.shop_id)
    .bind(&req.department)
    .bind(req.amount)
    .bind(&req.reason)
    .bind(req.is_paid)
    .bind(req.transaction_date)
    .fetch_one(&db_pool)
    .await?;

    audit::record(
        &db_pool,
        auth.user_id,
        "EDIT",
        "CREDIT",
        id,
        Some(old_values),
        Some(json!({
            "userId": updated.user_id,
            "shopId": updated.shop_id,
            "department": updated.department,
            "amount": updated.amount,
            "reason": updated.reason,
            "isPaid": updated.is_paid,
            "transactionDate": updated.transaction_date,
        })),
    )
    .await;

    // An edit may move the credit between (shop, date) pairs; both sides of
    // the move need their cached summaries refreshed.
    recalculate_day_for(&db_pool, credit.shop_id, credit.transaction_date).await;
    if (updated.shop_id, updated.transaction_date) != (credit.shop_id, credit.transaction_date) {
        recalculate_day_for(&db_pool, updated.shop_id, updated.transaction_date).await;
    }

    let row = fetch_credit_row(&db_pool, id).await?;
    Ok(Json(row.into_response()))
}

pub async fn delete_credit(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !auth.is_superadmin() {
        return Err(AppError::forbidden("Only superadmins can delete credits"));
    }

    let credit = find_credit(&db_pool, id).await?;

    audit::record(
        &db_pool,
        auth.user_id,
        "DELETE",
        "CREDIT",
        id,
        Some(json!({
            "userId": credit.user_id,
            "shopId": credit.shop_id,
            "department": credit.department,
            "amount": credit.amount,
            "reason": credit.reason,
            "isPaid": credit.is_paid,
            "transactionDate": credit.transaction_date,
        })),
        None,
    )
    .await;

    sqlx::query("DELETE FROM credits WHERE id = $1")
        .bind(id)
        .execute(&db_pool)
        .await?;

    recalculate_day_for(&db_pool, credit.shop_id, credit.transaction_date).await;

    Ok(StatusCode::NO_CONTENT)
}

// ==================== Helper Functions ====================

/// Recompute the summary cache for the day record matching a credit's shop and
/// date, when one exists and is locked. Best-effort by design.
async fn recalculate_day_for(pool: &PgPool, shop_id: Option<i64>, date: NaiveDate) {
    let Some(shop_id) = shop_id else { return };
    match daily_cash::find_by_shop_and_date(pool, shop_id, date).await {
        Ok(Some(record)) => summary::recalculate_if_locked(pool, &record).await,
        Ok(None) => {}
        Err(e) => {
            tracing::error!(shop_id, business_date = %date, error = ?e,
                "Failed to look up daily cash record for credit recalculation");
        }
    }
}

async fn find_credit(pool: &PgPool, id: i64) -> Result<Credit, AppError> {
    sqlx::query_as::<_, Credit>(
        r#"SELECT id, user_id, shop_id, department, amount, reason, is_paid,
                  transaction_date, created_at
           FROM credits WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("Credit entry not found"))
}

fn credit_select(suffix: &str) -> String {
    format!(
        r#"SELECT c.id, c.user_id, u.name AS user_name, c.shop_id, s.name AS shop_name,
                  c.department, c.amount, c.reason, c.is_paid, c.transaction_date, c.created_at
           FROM credits c
           JOIN users u ON c.user_id = u.id
           LEFT JOIN shops s ON c.shop_id = s.id
           {suffix}"#
    )
}

async fn fetch_credit_row(pool: &PgPool, id: i64) -> Result<CreditRow, AppError> {
    sqlx::query_as::<_, CreditRow>(&credit_select("WHERE c.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("Credit entry not found"))
}

/// Credits recorded against a shop on a business date, newest first. Shared
/// with the daily cash screen.
pub(crate) async fn fetch_credits_for_shop_date(
    pool: &PgPool,
    shop_id: i64,
    date: NaiveDate,
) -> Result<Vec<CreditResponse>, AppError> {
    let rows = sqlx::query_as::<_, CreditRow>(&credit_select(
        "WHERE c.shop_id = $1 AND c.transaction_date = $2 ORDER BY c.created_at DESC",
    ))
    .bind(shop_id)
    .bind(date)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(CreditRow::into_response).collect())
}

#[derive(sqlx::FromRow)]
pub(crate) struct CreditRow {
    id: i64,
    user_id: i64,
    user_name: String,
    shop_id: Option<i64>,
    shop_name: Option<String>,
    department: String,
    amount: f64,
    reason: Option<String>,
    is_paid: bool,
    transaction_date: NaiveDate,
    created_at: chrono::DateTime<Utc>,
}

impl CreditRow {
    fn into_response(self) -> CreditResponse {
        CreditResponse {
            id: self.id,
            user_id: self.user_id,
            user_name: self.user_name,
            shop_id: self.shop_id,
            shop_name: self.shop_name,
            department: self.department,
            amount: self.amount,
            reason: self.reason,
            is_paid: self.is_paid,
            transaction_date: self.transaction_date,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UnpaidRow {
    user_id: i64,
    user_name: String,
    total_unpaid: f64,
}

#[derive(sqlx::FromRow)]
struct OutstandingRow {
    total_unpaid: f64,
    unpaid_count: i64,
}
