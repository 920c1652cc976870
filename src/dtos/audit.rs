use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Deserialize)]
pub struct AuditLogQuery {
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct AuditLogResponse {
    pub id: i64,
    pub user_id: i64,
    pub user_name: Option<String>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: i64,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub created_at: DateTime<Utc>,
}
