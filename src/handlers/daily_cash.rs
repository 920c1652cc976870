use axum::{extract::{State, Path, Query}, Json, Extension};
use axum::http::StatusCode;
use chrono::{Duration, NaiveDate, Utc};
use serde_json::json;
use sqlx::PgPool;

use crate::state::AppState;
use crate::error::AppError;
use crate::dtos::daily_cash::*;
use crate::dtos::transaction::{EntryCreatedResponse, TransactionView};
use crate::middleware::auth::AuthContext;
use crate::models::daily_cash::{DailyCash, DayOperation};
use crate::services::{audit, daily_cash, summary, validate};

// ==================== Daily Screen ====================

/// Daily screen: get or lazily create the record for (shop, date) and return
/// it with its entry/credit lists and on-demand reconciliation totals.
pub async fn get_daily_cash_summary(
    State(AppState { db_pool }): State<AppState>,
    Path((shop_id, date)): Path<(i64, NaiveDate)>,
) -> Result<Json<DailyCashSummaryResponse>, AppError> {
    let record = daily_cash::get_or_create(&db_pool, shop_id, date).await?;
    fetch_summary_view(&db_pool, &record).await.map(Json)
}

/// Same view for today's business date.
pub async fn get_today_daily_cash(
    State(AppState { db_pool }): State<AppState>,
    Path(shop_id): Path<i64>,
) -> Result<Json<DailyCashSummaryResponse>, AppError> {
    let today = Utc::now().date_naive();
    let record = daily_cash::get_or_create(&db_pool, shop_id, today).await?;
    fetch_summary_view(&db_pool, &record).await.map(Json)
}

/// Latest closing balance of a closed day within the past `days_back` days
/// (default 7); 0.0 with a null date when none exists.
pub async fn get_latest_closing_balance(
    State(AppState { db_pool }): State<AppState>,
    Path(shop_id): Path<i64>,
    Query(params): Query<LatestBalanceQuery>,
) -> Result<Json<LatestBalanceResponse>, AppError> {
    let days_back = params.days_back.unwrap_or(7).clamp(1, 366);
    let end_date = Utc::now().date_naive();
    let start_date = end_date - Duration::days(days_back);

    let latest = sqlx::query_as::<_, LatestClosedRow>(
        r#"SELECT closing_cash, business_date FROM daily_cash
           WHERE shop_id = $1 AND locked = TRUE AND business_date BETWEEN $2 AND $3
           ORDER BY business_date DESC
           LIMIT 1"#,
    )
    .bind(shop_id)
    .bind(start_date)
    .bind(end_date)
    .fetch_optional(&db_pool)
    .await?;

    Ok(Json(match latest {
        Some(row) => LatestBalanceResponse {
            closing_cash: row.closing_cash.unwrap_or(0.0),
            business_date: Some(row.business_date),
            shop_id,
        },
        None => LatestBalanceResponse {
            closing_cash: 0.0,
            business_date: None,
            shop_id,
        },
    }))
}

// ==================== Ledger Entries ====================

pub async fn add_expense(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(req): Json<AddEntryRequest>,
) -> Result<(StatusCode, Json<EntryCreatedResponse>), AppError> {
    add_entry(&db_pool, &auth, id, "EXPENSE", req).await
}

pub async fn add_sale(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(req): Json<AddEntryRequest>,
) -> Result<(StatusCode, Json<EntryCreatedResponse>), AppError> {
    add_entry(&db_pool, &auth, id, "SALE", req).await
}

// ==================== Day Transitions ====================

/// Close the day: set closing cash and lock the record. One-way; a second
/// close attempt conflicts. The summary cache is computed as a best-effort
/// side effect of the close.
pub async fn close_day(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(req): Json<CloseDayRequest>,
) -> Result<Json<DailyCashResponse>, AppError> {
    let closing_cash = validate::required_amount(req.closing_cash, "closing_cash")?;

    let record = daily_cash::find_by_id(&db_pool, id).await?;
    if !record.status().allows(DayOperation::Close) {
        return Err(AppError::conflict("Day is already closed"));
    }

    let old_values = json!({
        "closingCash": record.closing_cash,
        "locked": record.locked,
        "closedBy": record.closed_by,
    });

    let updated = sqlx::query_as::<_, DailyCash>(
        r#"UPDATE daily_cash
           SET closing_cash = $1, locked = TRUE, closed_by = $2, closed_at = NOW()
           WHERE id = $3
           RETURNING id, shop_id, business_date, opening_cash, opening_confirmed,
                     closing_cash, locked, closed_by, closed_at"#,
    )
    .bind(closing_cash)
    .bind(auth.user_id)
    .bind(id)
    .fetch_one(&db_pool)
    .await?;

    audit::record(
        &db_pool,
        auth.user_id,
        "CLOSE_DAY",
        "DAILY_CASH",
        id,
        Some(old_values),
        Some(json!({
            "closingCash": closing_cash,
            "locked": true,
            "closedBy": auth.user_id,
            "closedAt": updated.closed_at,
        })),
    )
    .await;

    tracing::info!(daily_cash_id = id, closing_cash, "Day closed");

    // The close itself is the source of truth; cache computation must not
    // fail it.
    summary::recalculate_if_locked(&db_pool, &updated).await;

    fetch_record_view(&db_pool, &updated).await.map(Json)
}

/// Confirm (or correct) the opening balance. Deliberately not gated on the
/// lock state so end-of-month corrections remain possible; a correction to a
/// closed day refreshes its cached summary.
pub async fn confirm_opening_balance(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(req): Json<OpeningBalanceRequest>,
) -> Result<Json<DailyCashResponse>, AppError> {
    let opening_cash = validate::required_amount(req.opening_cash, "opening_cash")?;

    let record = daily_cash::find_by_id(&db_pool, id).await?;
    if !record.status().allows(DayOperation::ConfirmOpening) {
        return Err(AppError::conflict("Day does not accept opening corrections"));
    }
    let was_confirmed = record.opening_confirmed;

    let updated = sqlx::query_as::<_, DailyCash>(
        r#"UPDATE daily_cash
           SET opening_cash = $1, opening_confirmed = TRUE
           WHERE id = $2
           RETURNING id, shop_id, business_date, opening_cash, opening_confirmed,
                     closing_cash, locked, closed_by, closed_at"#,
    )
    .bind(opening_cash)
    .bind(id)
    .fetch_one(&db_pool)
    .await?;

    // The first confirmation replaces a system-seeded default; there is no
    // meaningful old value to diff until a confirmed value is overwritten.
    let old_values = was_confirmed.then(|| {
        json!({
            "openingCash": record.opening_cash,
            "openingConfirmed": record.opening_confirmed,
        })
    });
    audit::record(
        &db_pool,
        auth.user_id,
        "CONFIRM_OPENING",
        "DAILY_CASH",
        id,
        old_values,
        Some(json!({ "openingCash": opening_cash, "openingConfirmed": true })),
    )
    .await;

    summary::recalculate_if_locked(&db_pool, &updated).await;

    fetch_record_view(&db_pool, &updated).await.map(Json)
}

// ==================== Admin Corrections ====================

/// Superadmin field-level correction of a day record's financial fields.
pub async fn update_daily_cash(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateDailyCashRequest>,
) -> Result<Json<DailyCashResponse>, AppError> {
    if !auth.is_superadmin() {
        return Err(AppError::forbidden("Only superadmins can edit daily cash records"));
    }
    if let Some(opening) = req.opening_cash {
        validate::required_amount(Some(opening), "opening_cash")?;
    }
    if let Some(closing) = req.closing_cash {
        validate::required_amount(Some(closing), "closing_cash")?;
    }

    let record = daily_cash::find_by_id(&db_pool, id).await?;

    let old_values = json!({
        "openingCash": record.opening_cash,
        "openingConfirmed": record.opening_confirmed,
        "closingCash": record.closing_cash,
    });

    let updated = sqlx::query_as::<_, DailyCash>(
        r#"UPDATE daily_cash
           SET opening_cash = COALESCE($2, opening_cash),
               closing_cash = COALESCE($3, closing_cash),
               opening_confirmed = COALESCE($4, opening_confirmed)
           WHERE id = $1
           RETURNING id, shop_id, business_date, opening_cash, opening_confirmed,
                     closing_cash, locked, closed_by, closed_at"#,
    )
    .bind(id)
    .bind(req.opening_cash)
    .bind(req.closing_cash)
    .bind(req.opening_confirmed)
    .fetch_one(&db_pool)
    .await?;

    audit::record(
        &db_pool,
        auth.user_id,
        "EDIT",
        "DAILY_CASH",
        id,
        Some(old_values),
        Some(json!({
            "openingCash": updated.opening_cash,
            "openingConfirmed": updated.opening_confirmed,
            "closingCash": updated.closing_cash,
        })),
    )
    .await;

    summary::recalculate_if_locked(&db_pool, &updated).await;

    fetch_record_view(&db_pool, &updated).await.map(Json)
}

/// Superadmin delete of a day record. Ledger entries go with it (cascade) and
/// the derived summary row is removed rather than left orphaned.
pub async fn delete_daily_cash(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !auth.is_superadmin() {
        return Err(AppError::forbidden("Only superadmins can delete daily cash records"));
    }

    let record = daily_cash::find_by_id(&db_pool, id).await?;

    audit::record(
        &db_pool,
        auth.user_id,
        "DELETE",
        "DAILY_CASH",
        id,
        Some(json!({
            "shopId": record.shop_id,
            "businessDate": record.business_date,
            "openingCash": record.opening_cash,
            "closingCash": record.closing_cash,
            "locked": record.locked,
        })),
        None,
    )
    .await;

    let mut tx = db_pool.begin().await?;
    sqlx::query("DELETE FROM daily_summaries WHERE shop_id = $1 AND business_date = $2")
        .bind(record.shop_id)
        .bind(record.business_date)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM daily_cash WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!(daily_cash_id = id, shop_id = record.shop_id, "Daily cash record deleted");

    Ok(Json(json!({
        "message": "Daily cash record deleted",
        "warning": "All associated ledger entries were also deleted",
    })))
}

// ==================== Helper Functions ====================

async fn add_entry(
    db_pool: &PgPool,
    auth: &AuthContext,
    daily_cash_id: i64,
    entry_type: &str,
    req: AddEntryRequest,
) -> Result<(StatusCode, Json<EntryCreatedResponse>), AppError> {
    let amount = validate::positive_amount(req.amount, "amount")?;

    let record = daily_cash::find_by_id(db_pool, daily_cash_id).await?;
    // Late entries after close are allowed; the policy table keeps the gate
    // explicit and changeable in one place.
    if !record.status().allows(DayOperation::AddEntry) {
        return Err(AppError::conflict("Day does not accept ledger entries"));
    }

    // Category is advisory metadata; an unresolvable id is saved as null.
    let expense_category_id = match (entry_type, req.expense_category_id) {
        ("EXPENSE", Some(category_id)) => {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM expense_categories WHERE id = $1)",
            )
            .bind(category_id)
            .fetch_one(db_pool)
            .await?;
            if !exists {
                tracing::warn!(category_id, "Unknown expense category, saving entry without one");
            }
            exists.then_some(category_id)
        }
        _ => None,
    };

    let entry_id: i64 = sqlx::query_scalar(
        r#"INSERT INTO cash_transactions
             (daily_cash_id, entry_type, amount, expense_category_id, description, recorded_by)
           VALUES ($1, $2, $3, $4, $5, $6)
           RETURNING id"#,
    )
    .bind(daily_cash_id)
    .bind(entry_type)
    .bind(amount)
    .bind(expense_category_id)
    .bind(&req.description)
    .bind(auth.user_id)
    .fetch_one(db_pool)
    .await?;

    audit::record(
        db_pool,
        auth.user_id,
        "CREATE",
        "CASH_TRANSACTION",
        entry_id,
        None,
        Some(json!({
            "dailyCashId": daily_cash_id,
            "type": entry_type,
            "amount": amount,
            "expenseCategoryId": expense_category_id,
            "description": req.description,
        })),
    )
    .await;

    // A late entry against a closed day must be reflected in the cache.
    summary::recalculate_if_locked(db_pool, &record).await;

    Ok((StatusCode::CREATED, Json(EntryCreatedResponse { id: entry_id })))
}

async fn closed_by_name(db_pool: &PgPool, record: &DailyCash) -> Result<Option<String>, AppError> {
    match record.closed_by {
        Some(user_id) => Ok(sqlx::query_scalar("SELECT name FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(db_pool)
            .await?),
        None => Ok(None),
    }
}

async fn fetch_record_view(
    db_pool: &PgPool,
    record: &DailyCash,
) -> Result<DailyCashResponse, AppError> {
    Ok(DailyCashResponse {
        id: record.id,
        shop_id: record.shop_id,
        business_date: record.business_date,
        opening_cash: record.opening_cash,
        opening_confirmed: record.opening_confirmed,
        closing_cash: record.closing_cash,
        locked: record.locked,
        closed_by_name: closed_by_name(db_pool, record).await?,
        closed_at: record.closed_at,
    })
}

async fn fetch_summary_view(
    db_pool: &PgPool,
    record: &DailyCash,
) -> Result<DailyCashSummaryResponse, AppError> {
    let shop = sqlx::query_as::<_, ShopRow>("SELECT id, code, name FROM shops WHERE id = $1")
        .bind(record.shop_id)
        .fetch_optional(db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Shop not found"))?;

    let entries = sqlx::query_as::<_, TransactionRow>(
        r#"SELECT ct.id, ct.entry_type, ct.amount, ct.expense_category_id,
                  ec.name AS expense_category_name, ct.description,
                  u.name AS recorded_by_name, ct.created_at
           FROM cash_transactions ct
           LEFT JOIN expense_categories ec ON ct.expense_category_id = ec.id
           LEFT JOIN users u ON ct.recorded_by = u.id
           WHERE ct.daily_cash_id = $1
           ORDER BY ct.created_at DESC"#,
    )
    .bind(record.id)
    .fetch_all(db_pool)
    .await?;

    let credits =
        super::credit::fetch_credits_for_shop_date(db_pool, record.shop_id, record.business_date)
            .await?;

    let total_expenses: f64 = entries
        .iter()
        .filter(|e| e.entry_type == "EXPENSE")
        .map(|e| e.amount)
        .sum();
    let manual_sales: f64 = entries
        .iter()
        .filter(|e| e.entry_type == "SALE")
        .map(|e| e.amount)
        .sum();
    let total_credits: f64 = credits.iter().map(|c| c.amount).sum();

    let figures = summary::ReconciliationFigures::compute(&summary::ReconciliationInputs {
        opening_cash: record.opening_cash,
        closing_cash: record.closing_cash,
        total_expenses,
        manual_sales,
        total_credits,
    });
    // The reconciled totals only mean something once a closing count exists.
    let closed = record.closing_cash.is_some();

    let (expenses, sales): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .map(TransactionRow::into_view)
        .partition(|e| e.entry_type == "EXPENSE");

    Ok(DailyCashSummaryResponse {
        daily_cash_id: record.id,
        shop_id: shop.id,
        shop_code: shop.code,
        shop_name: shop.name,
        business_date: record.business_date,
        opening_cash: record.opening_cash,
        opening_confirmed: record.opening_confirmed,
        closing_cash: record.closing_cash,
        locked: record.locked,
        closed_by_name: closed_by_name(db_pool, record).await?,
        total_expenses,
        manual_sales,
        total_credits,
        total_sales: closed.then_some(figures.total_sales),
        expected_closing: closed.then_some(figures.expected_closing),
        variance: closed.then_some(figures.variance),
        expenses,
        sales,
        credits,
    })
}

#[derive(sqlx::FromRow)]
struct ShopRow {
    id: i64,
    code: String,
    name: String,
}

#[derive(sqlx::FromRow)]
struct LatestClosedRow {
    closing_cash: Option<f64>,
    business_date: NaiveDate,
}

#[derive(sqlx::FromRow)]
pub(crate) struct TransactionRow {
    pub id: i64,
    pub entry_type: String,
    pub amount: f64,
    pub expense_category_id: Option<i64>,
    pub expense_category_name: Option<String>,
    pub description: Option<String>,
    pub recorded_by_name: Option<String>,
    pub created_at: chrono::DateTime<Utc>,
}

impl TransactionRow {
    fn into_view(self) -> TransactionView {
        TransactionView {
            id: self.id,
            entry_type: self.entry_type,
            amount: self.amount,
            expense_category_id: self.expense_category_id,
            expense_category_name: self.expense_category_name,
            description: self.description,
            recorded_by_name: self.recorded_by_name,
            created_at: self.created_at,
        }
    }
}
