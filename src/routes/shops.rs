use axum::{
    routing::{get, post},
    Router, middleware,
};
use crate::state::AppState;
use crate::handlers::shop::{create_shop, get_shop, list_shops, get_shops_summary};
use crate::middleware::auth::require_auth;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/shops", get(list_shops))
        .route("/shops", post(create_shop))
        .route("/shops/summary", get(get_shops_summary))
        .route("/shops/{id}", get(get_shop))
        .layer(middleware::from_fn(require_auth))
}
