use sqlx::PgPool;

/// Append an audit log entry for a privileged or state-changing mutation.
///
/// The audit trail is a side channel: a failed append is logged and swallowed
/// so it never rolls back the mutation that triggered it.
pub async fn record(
    pool: &PgPool,
    user_id: i64,
    action: &str,
    entity_type: &str,
    entity_id: i64,
    old_value: Option<serde_json::Value>,
    new_value: Option<serde_json::Value>,
) {
    let result = sqlx::query(
        r#"INSERT INTO audit_logs (user_id, action, entity_type, entity_id, old_value, new_value)
           VALUES ($1, $2, $3, $4, $5, $6)"#,
    )
    .bind(user_id)
    .bind(action)
    .bind(entity_type)
    .bind(entity_id)
    .bind(old_value.map(|v| v.to_string()))
    .bind(new_value.map(|v| v.to_string()))
    .execute(pool)
    .await;

    if let Err(e) = result {
        tracing::error!(
            action,
            entity_type,
            entity_id,
            error = %e,
            "Failed to write audit log"
        );
    }
}
