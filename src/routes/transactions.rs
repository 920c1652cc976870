use axum::{
    routing::{get, put, delete},
    Router, middleware,
};
use crate::state::AppState;
use crate::handlers::transaction::{get_transaction, update_transaction, delete_transaction};
use crate::middleware::auth::require_auth;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/transactions/{id}", get(get_transaction))
        .route("/admin/transactions/{id}", put(update_transaction))
        .route("/admin/transactions/{id}", delete(delete_transaction))
        .layer(middleware::from_fn(require_auth))
}
