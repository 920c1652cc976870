use axum::{
    routing::{get, post},
    Router, middleware,
};
use crate::state::AppState;
use crate::handlers::user::{register_user, login_user, get_me, list_users};
use crate::middleware::auth::require_auth;

pub fn routes() -> Router<AppState> {
    // Login is the only open route
    let open_routes = Router::new().route("/auth/login", post(login_user));

    let protected_routes = Router::new()
        .route("/users", get(list_users))
        .route("/users", post(register_user))
        .route("/users/me", get(get_me))
        .layer(middleware::from_fn(require_auth));

    open_routes.merge(protected_routes)
}
