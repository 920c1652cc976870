pub mod shops;
pub mod users;
pub mod expense_categories;
pub mod daily_cash;
pub mod transactions;
pub mod credits;
pub mod summaries;
pub mod audit_logs;

use axum::Router;
use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(shops::routes())
        .merge(users::routes())
        .merge(expense_categories::routes())
        .merge(daily_cash::routes())
        .merge(transactions::routes())
        .merge(credits::routes())
        .merge(summaries::routes())
        .merge(audit_logs::routes())
}
