use axum::{
    routing::get,
    Router, middleware,
};
use crate::state::AppState;
use crate::handlers::audit::list_audit_logs;
use crate::middleware::auth::require_auth;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/audit-logs", get(list_audit_logs))
        .layer(middleware::from_fn(require_auth))
}
