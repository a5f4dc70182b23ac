use axum::extract::{Path, State};
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use buddy_shared::errors::{AppError, AppResult, ErrorCode};
use buddy_shared::types::ApiResponse;

use crate::models::{NewUser, User};
use crate::schema::users;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UserPayload {
    pub name: String,
}

// --- POST /users ---

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UserPayload>,
) -> AppResult<Json<ApiResponse<User>>> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let user = diesel::insert_into(users::table)
        .values(&NewUser { name: name.to_string() })
        .get_result::<User>(&mut conn)
        .map_err(AppError::Database)?;

    tracing::info!(user_id = %user.id, "user created");
    Ok(Json(ApiResponse::ok(user)))
}

// --- GET /users/:id ---

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<User>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let user = users::table
        .find(user_id)
        .first::<User>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;
    Ok(Json(ApiResponse::ok(user)))
}

// --- PUT /users/:id ---

pub async fn rename_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UserPayload>,
) -> AppResult<Json<ApiResponse<User>>> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let user = diesel::update(users::table.find(user_id))
        .set(users::name.eq(name))
        .get_result::<User>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;
    Ok(Json(ApiResponse::ok(user)))
}

// --- DELETE /users/:id ---

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Uuid>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let deleted = diesel::delete(users::table.find(user_id))
        .execute(&mut conn)
        .map_err(AppError::Database)?;
    if deleted == 0 {
        return Err(AppError::new(ErrorCode::UserNotFound, "user not found"));
    }

    tracing::info!(user_id = %user_id, "user deleted");
    Ok(Json(ApiResponse::ok(user_id)))
}
