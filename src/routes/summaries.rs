use axum::{
    routing::{get, post},
    Router, middleware,
};
use crate::state::AppState;
use crate::handlers::summary::{get_summary, list_summaries, recalculate_summary, recalculate_range};
use crate::middleware::auth::require_auth;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/summaries", get(list_summaries))
        .route("/summaries/{id}/{date}", get(get_summary))
        .route("/admin/daily-cash/{id}/recalculate-summary", post(recalculate_summary))
        .route("/admin/summaries/recalculate", post(recalculate_range))
        .layer(middleware::from_fn(require_auth))
}
