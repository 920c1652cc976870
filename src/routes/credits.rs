use axum::{
    routing::{get, post, patch, put, delete},
    Router, middleware,
};
use crate::state::AppState;
use crate::handlers::credit::{
    list_credits, filter_credits, create_credit, update_paid_status,
    get_unpaid_summary, get_outstanding_total, update_credit, delete_credit,
};
use crate::middleware::auth::require_auth;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/credits", get(list_credits))
        .route("/credits", post(create_credit))
        .route("/credits/filter", get(filter_credits))
        .route("/credits/summary", get(get_unpaid_summary))
        .route("/credits/outstanding-total", get(get_outstanding_total))
        .route("/credits/{id}", patch(update_paid_status))
        .route("/admin/credits/{id}", put(update_credit))
        .route("/admin/credits/{id}", delete(delete_credit))
        .layer(middleware::from_fn(require_auth))
}
