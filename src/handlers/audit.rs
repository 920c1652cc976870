use axum::{extract::{State, Query}, Json, Extension};
use crate::state::AppState;
use crate::error::AppError;
use crate::dtos::audit::{AuditLogQuery, AuditLogResponse};
use crate::middleware::auth::AuthContext;

pub async fn list_audit_logs(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<AuditLogQuery>,
) -> Result<Json<Vec<AuditLogResponse>>, AppError> {
    if !auth.is_superadmin() {
        return Err(AppError::forbidden("Only superadmins can view audit logs"));
    }

    let limit = params.limit.unwrap_or(100).clamp(1, 1000);

    let rows = sqlx::query_as::<_, AuditLogRow>(
        r#"SELECT al.id, al.user_id, u.name AS user_name, al.action, al.entity_type,
                  al.entity_id, al.old_value, al.new_value, al.created_at
           FROM audit_logs al
           LEFT JOIN users u ON al.user_id = u.id
           ORDER BY al.created_at DESC
           LIMIT $1"#,
    )
    .bind(limit)
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(
        rows.into_iter()
            .map(|r| AuditLogResponse {
                id: r.id,
                user_id: r.user_id,
                user_name: r.user_name,
                action: r.action,
                entity_type: r.entity_type,
                entity_id: r.entity_id,
                old_value: r.old_value,
                new_value: r.new_value,
                created_at: r.created_at,
            })
            .collect(),
    ))
}

#[derive(sqlx::FromRow)]
struct AuditLogRow {
    id: i64,
    user_id: i64,
    user_name: Option<String>,
    action: String,
    entity_type: String,
    entity_id: i64,
    old_value: Option<String>,
    new_value: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}
