use axum::{extract::State, Json, Extension};
use axum::http::StatusCode;
use crate::state::AppState;
use crate::error::AppError;
use crate::dtos::shop::{CreateShopRequest, ShopResponse, ShopCashSummary};
use crate::middleware::auth::AuthContext;
use crate::models::shop::Shop;

pub async fn create_shop(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateShopRequest>,
) -> Result<(StatusCode, Json<ShopResponse>), AppError> {
    if !auth.is_superadmin() {
        return Err(AppError::forbidden("Only superadmins can create shops"));
    }

    if req.code.trim().is_empty() {
        return Err(AppError::validation("Shop code is required"));
    }
    if req.name.trim().is_empty() {
        return Err(AppError::validation("Shop name is required"));
    }

    let shop = sqlx::query_as::<_, Shop>(
        r#"INSERT INTO shops (code, name)
           VALUES ($1, $2)
           RETURNING id, code, name"#,
    )
    .bind(req.code.trim().to_uppercase())
    .bind(req.name.trim())
    .fetch_one(&db_pool)
    .await
    .map_err(|e| {
        if let Some(db) = e.as_database_error() {
            if db.code().as_deref() == Some("23505") {
                return AppError::conflict("Shop code already exists");
            }
        }
        AppError::db(e)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(ShopResponse {
            id: shop.id,
            code: shop.code,
            name: shop.name,
        }),
    ))
}

pub async fn get_shop(
    State(AppState { db_pool }): State<AppState>,
    axum::extract::Path(id): axum::extract::Path<i64>,
) -> Result<Json<ShopResponse>, AppError> {
    let shop = sqlx::query_as::<_, Shop>("SELECT id, code, name FROM shops WHERE id = $1")
        .bind(id)
        .fetch_optional(&db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Shop not found"))?;

    Ok(Json(ShopResponse {
        id: shop.id,
        code: shop.code,
        name: shop.name,
    }))
}

pub async fn list_shops(
    State(AppState { db_pool }): State<AppState>,
) -> Result<Json<Vec<ShopResponse>>, AppError> {
    let shops = sqlx::query_as::<_, Shop>("SELECT id, code, name FROM shops ORDER BY name ASC")
        .fetch_all(&db_pool)
        .await?;

    Ok(Json(
        shops
            .into_iter()
            .map(|s| ShopResponse {
                id: s.id,
                code: s.code,
                name: s.name,
            })
            .collect(),
    ))
}

/// Main menu: each shop with its most recent daily cash record's closing
/// balance, whether or not that day has been closed yet.
pub async fn get_shops_summary(
    State(AppState { db_pool }): State<AppState>,
) -> Result<Json<Vec<ShopCashSummary>>, AppError> {
    let rows = sqlx::query_as::<_, ShopLatestRow>(
        r#"SELECT DISTINCT ON (s.id)
              s.id AS shop_id, s.code AS shop_code, s.name AS shop_name,
              dc.closing_cash AS latest_closing_cash,
              dc.business_date AS last_updated_date
           FROM shops s
           LEFT JOIN daily_cash dc ON dc.shop_id = s.id
           ORDER BY s.id, dc.business_date DESC"#,
    )
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(
        rows.into_iter()
            .map(|r| ShopCashSummary {
                shop_id: r.shop_id,
                shop_code: r.shop_code,
                shop_name: r.shop_name,
                latest_closing_cash: r.latest_closing_cash,
                last_updated_date: r.last_updated_date,
            })
            .collect(),
    ))
}

#[derive(sqlx::FromRow)]
struct ShopLatestRow {
    shop_id: i64,
    shop_code: String,
    shop_name: String,
    latest_closing_cash: Option<f64>,
    last_updated_date: Option<chrono::NaiveDate>,
}
