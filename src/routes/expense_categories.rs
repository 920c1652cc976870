use axum::{
    routing::{get, post},
    Router, middleware,
};
use crate::state::AppState;
use crate::handlers::expense_category::{list_categories, create_category};
use crate::middleware::auth::require_auth;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expense-categories", get(list_categories))
        .route("/expense-categories", post(create_category))
        .layer(middleware::from_fn(require_auth))
}
