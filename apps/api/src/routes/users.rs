//! # User Routes
//!
//! Back-office account management: listing, creation, password change.
//! No token or session mechanics - those live outside this system.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::auth::{hash_password, verify_password};
use crate::error::{ApiError, ErrorCode};
use crate::state::AppState;
use balcao_core::{validation, User};
use balcao_db::repository::user::generate_user_id;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// The password hash never leaves the server.
impl From<User> for UserDto {
    fn from(u: User) -> Self {
        UserDto {
            id: u.id,
            name: u.name,
            username: u.username,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub name: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    pub username: String,
    pub current_password: String,
    pub new_password: String,
}

/// GET /api/users
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<UserDto>>, ApiError> {
    let users = state.db.users().list().await?;
    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

/// POST /api/users
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<UserPayload>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    validation::validate_required_text("nome", &payload.name, 200)?;
    validation::validate_required_text("usuario", &payload.username, 50)?;
    if payload.password.len() < 8 {
        return Err(ApiError::validation("senha must be at least 8 characters"));
    }

    let user = User {
        id: generate_user_id(),
        name: payload.name.trim().to_string(),
        username: payload.username.trim().to_string(),
        password_hash: hash_password(&payload.password)?,
        created_at: Utc::now(),
    };

    state.db.users().insert(&user).await?;
    info!(id = %user.id, username = %user.username, "User created");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /api/users/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if payload.new_password.len() < 8 {
        return Err(ApiError::validation(
            "nova senha must be at least 8 characters",
        ));
    }

    let user = state
        .db
        .users()
        .get_by_username(&payload.username)
        .await?
        .ok_or_else(|| ApiError::not_found("User", &payload.username))?;

    if !verify_password(&payload.current_password, &user.password_hash)? {
        return Err(ApiError::new(
            ErrorCode::ValidationError,
            "Senha atual incorreta",
        ));
    }

    let new_hash = hash_password(&payload.new_password)?;
    state.db.users().set_password_hash(&user.id, &new_hash).await?;
    info!(id = %user.id, "Password changed");

    Ok(Json(json!({ "message": "Senha alterada com sucesso" })))
}
