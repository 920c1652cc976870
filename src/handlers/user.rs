use bcrypt::{hash, verify, DEFAULT_COST};
use crate::dtos::user::{RegisterUserRequest, UserResponse, LoginRequest, LoginResponse};
use crate::auth::jwt::sign_token;
use crate::error::AppError;
use axum::{extract::State, Json};
use crate::state::AppState;
use crate::middleware::auth::AuthContext;
use axum::extract::Extension;

const VALID_ROLES: &[&str] = &["superadmin", "manager", "staff"];

pub async fn register_user(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(axum::http::StatusCode, Json<UserResponse>), AppError> {
    if !auth.is_superadmin() {
        return Err(AppError::forbidden("Only superadmins can register users"));
    }
    if !VALID_ROLES.contains(&payload.role.as_str()) {
        return Err(AppError::validation("Invalid role"));
    }
    if payload.username.trim().is_empty() {
        return Err(AppError::validation("Username required"));
    }
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Name required"));
    }
    if payload.password.len() < 6 {
        return Err(AppError::validation("Password too short"));
    }

    let password_hash = hash(&payload.password, DEFAULT_COST)
        .map_err(|e| AppError::internal(format!("Hash error: {e}")))?;

    let rec = sqlx::query_as::<_, UserProfileRow>(
        r#"INSERT INTO users (username, password_hash, name, role)
           VALUES ($1, $2, $3, $4)
           RETURNING id, username, name, role, is_active, created_at"#,
    )
    .bind(payload.username.trim())
    .bind(password_hash)
    .bind(payload.name.trim())
    .bind(&payload.role)
    .fetch_one(&db_pool)
    .await
    .map_err(|e| {
        if let Some(db_err) = e.as_database_error() {
            if db_err.code().as_deref() == Some("23505") {
                return AppError::conflict("Username already exists");
            }
        }
        AppError::db(e)
    })?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(UserResponse {
            id: rec.id,
            username: rec.username,
            name: rec.name,
            role: rec.role,
            is_active: rec.is_active,
            created_at: rec.created_at,
        }),
    ))
}

pub async fn login_user(
    State(AppState { db_pool }): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::validation("Username required"));
    }
    if payload.password.is_empty() {
        return Err(AppError::validation("Password required"));
    }

    let user = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, password_hash, role, is_active FROM users WHERE username = $1",
    )
    .bind(&payload.username)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Invalid credentials"))?;

    if !user.is_active {
        return Err(AppError::conflict("User inactive"));
    }

    let ok = verify(&payload.password, &user.password_hash)
        .map_err(|e| AppError::internal(format!("Password verify error: {e}")))?;

    if !ok {
        return Err(AppError::validation("Invalid credentials"));
    }

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::internal("JWT secret not configured"))?;

    let token = sign_token(user.id, &user.role, &user.username, &secret)?;

    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "Bearer",
        expires_in_seconds: 8 * 60 * 60,
    }))
}

pub async fn get_me(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<UserResponse>, AppError> {
    let rec = sqlx::query_as::<_, UserProfileRow>(
        "SELECT id, username, name, role, is_active, created_at FROM users WHERE id = $1",
    )
    .bind(auth.user_id)
    .fetch_one(&db_pool)
    .await?;

    Ok(Json(UserResponse {
        id: rec.id,
        username: rec.username,
        name: rec.name,
        role: rec.role,
        is_active: rec.is_active,
        created_at: rec.created_at,
    }))
}

/// Active users, for attributing credits and ledger entries.
pub async fn list_users(
    State(AppState { db_pool }): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = sqlx::query_as::<_, UserProfileRow>(
        "SELECT id, username, name, role, is_active, created_at FROM users WHERE is_active = TRUE ORDER BY name ASC",
    )
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(
        users
            .into_iter()
            .map(|u| UserResponse {
                id: u.id,
                username: u.username,
                name: u.name,
                role: u.role,
                is_active: u.is_active,
                created_at: u.created_at,
            })
            .collect(),
    ))
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    role: String,
    is_active: bool,
}

#[derive(sqlx::FromRow)]
struct UserProfileRow {
    id: i64,
    username: String,
    name: String,
    role: String,
    is_active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}
