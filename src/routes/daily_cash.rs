use axum::{
    routing::{get, post, patch, put, delete},
    Router, middleware,
};
use crate::state::AppState;
use crate::handlers::daily_cash::{
    get_daily_cash_summary, get_today_daily_cash, get_latest_closing_balance,
    add_expense, add_sale, close_day, confirm_opening_balance,
    update_daily_cash, delete_daily_cash,
};
use crate::middleware::auth::require_auth;

pub fn routes() -> Router<AppState> {
    Router::new()
        // The first path segment is the shop id on reads and the record id on
        // mutations, mirroring the client API; one param name keeps the
        // router's path tree conflict-free.
        .route("/daily-cash/{id}", get(get_today_daily_cash))
        .route("/daily-cash/{id}/latest-closing-balance", get(get_latest_closing_balance))
        .route("/daily-cash/{id}/{date}", get(get_daily_cash_summary))
        .route("/daily-cash/{id}/expenses", post(add_expense))
        .route("/daily-cash/{id}/sales", post(add_sale))
        .route("/daily-cash/{id}/close", post(close_day))
        .route("/daily-cash/{id}/opening", patch(confirm_opening_balance))
        .route("/admin/daily-cash/{id}", put(update_daily_cash))
        .route("/admin/daily-cash/{id}", delete(delete_daily_cash))
        .layer(middleware::from_fn(require_auth))
}
