use axum::{extract::{State, Path, Query}, Json, Extension};
use chrono::NaiveDate;

use crate::state::AppState;
use crate::error::AppError;
use crate::dtos::summary::{RecalculateRangeResponse, SummaryRangeQuery};
use crate::middleware::auth::AuthContext;
use crate::models::daily_summary::DailySummary;
use crate::services::summary;

/// Stored (cached) summary for one shop and date. Missing means the day has
/// never been closed.
pub async fn get_summary(
    State(AppState { db_pool }): State<AppState>,
    Path((shop_id, date)): Path<(i64, NaiveDate)>,
) -> Result<Json<DailySummary>, AppError> {
    summary::get_summary(&db_pool, shop_id, date)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Daily summary not found"))
}

/// Cached summaries over a date range, optionally narrowed to one shop. The
/// multi-month report path: reads only the cache, never recomputes.
pub async fn list_summaries(
    State(AppState { db_pool }): State<AppState>,
    Query(params): Query<SummaryRangeQuery>,
) -> Result<Json<Vec<DailySummary>>, AppError> {
    if params.start_date > params.end_date {
        return Err(AppError::validation("start_date must not be after end_date"));
    }
    let summaries =
        summary::list_summaries(&db_pool, params.start_date, params.end_date, params.shop_id)
            .await?;
    Ok(Json(summaries))
}

/// Force-recompute the summary for one day record.
pub async fn recalculate_summary(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<DailySummary>, AppError> {
    if !auth.is_superadmin() {
        return Err(AppError::forbidden("Only superadmins can recalculate summaries"));
    }
    let recalculated = summary::recalculate_for_day(&db_pool, id).await?;
    Ok(Json(recalculated))
}

/// Force-recompute every locked day in a range; the bulk-correction and
/// backfill driver.
pub async fn recalculate_range(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<SummaryRangeQuery>,
) -> Result<Json<RecalculateRangeResponse>, AppError> {
    if !auth.is_superadmin() {
        return Err(AppError::forbidden("Only superadmins can recalculate summaries"));
    }
    if params.start_date > params.end_date {
        return Err(AppError::validation("start_date must not be after end_date"));
    }
    let count = summary::recalculate_range(&db_pool, params.start_date, params.end_date).await?;
    Ok(Json(RecalculateRangeResponse { count }))
}
