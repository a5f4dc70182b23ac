use axum::extract::{Path, State};
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use buddy_shared::errors::{AppError, AppResult, ErrorCode};
use buddy_shared::types::ApiResponse;

use crate::models::{Course, Enrollment, NewCourse, User};
use crate::schema::{courses, enrollments, users};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct EnrollPayload {
    pub course_code: String,
    pub title: Option<String>,
}

// --- POST /users/:id/enrollments ---

/// Enroll a user in a course, creating the course on first sight. Both
/// inserts are idempotent; re-enrolling is a no-op, not an error.
pub async fn enroll(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<EnrollPayload>,
) -> AppResult<Json<ApiResponse<Enrollment>>> {
    let code = payload.course_code.trim();
    if code.is_empty() {
        return Err(AppError::Validation("course_code must not be empty".into()));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    diesel::insert_into(courses::table)
        .values(&NewCourse {
            code: code.to_string(),
            title: payload.title.clone(),
        })
        .on_conflict(courses::code)
        .do_nothing()
        .execute(&mut conn)
        .map_err(AppError::Database)?;

    let enrollment = Enrollment {
        user_id,
        course_code: code.to_string(),
    };
    diesel::insert_into(enrollments::table)
        .values(&enrollment)
        .on_conflict_do_nothing()
        .execute(&mut conn)
        .map_err(AppError::Database)?;

    tracing::info!(user_id = %user_id, course = code, "enrolled");
    Ok(Json(ApiResponse::ok(enrollment)))
}

// --- DELETE /users/:id/enrollments/:code ---

pub async fn drop_course(
    State(state): State<Arc<AppState>>,
    Path((user_id, course_code)): Path<(Uuid, String)>,
) -> AppResult<Json<ApiResponse<String>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let deleted = diesel::delete(
        enrollments::table
            .filter(enrollments::user_id.eq(user_id))
            .filter(enrollments::course_code.eq(&course_code)),
    )
    .execute(&mut conn)
    .map_err(AppError::Database)?;
    if deleted == 0 {
        return Err(AppError::new(
            ErrorCode::NotEnrolled,
            "user is not enrolled in this course",
        ));
    }
    Ok(Json(ApiResponse::ok(course_code)))
}

// --- GET /courses ---

pub async fn list_courses(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<Course>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let all = courses::table
        .order(courses::code)
        .load::<Course>(&mut conn)
        .map_err(AppError::Database)?;
    Ok(Json(ApiResponse::ok(all)))
}

// --- GET /users/:id/courses ---

pub async fn courses_for_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Course>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let enrolled = courses::table
        .inner_join(enrollments::table)
        .filter(enrollments::user_id.eq(user_id))
        .order(courses::code)
        .select(courses::all_columns)
        .load::<Course>(&mut conn)
        .map_err(AppError::Database)?;
    Ok(Json(ApiResponse::ok(enrolled)))
}

// --- GET /users/:id/classmates/:code ---

/// Everyone co-enrolled with the user in a course, excluding the user.
pub async fn classmates(
    State(state): State<Arc<AppState>>,
    Path((user_id, course_code)): Path<(Uuid, String)>,
) -> AppResult<Json<ApiResponse<Vec<User>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let enrolled: i64 = enrollments::table
        .filter(enrollments::user_id.eq(user_id))
        .filter(enrollments::course_code.eq(&course_code))
        .count()
        .get_result(&mut conn)
        .map_err(AppError::Database)?;
    if enrolled == 0 {
        return Err(AppError::new(
            ErrorCode::NotEnrolled,
            "user is not enrolled in this course",
        ));
    }

    let classmate_ids = enrollments::table
        .filter(enrollments::course_code.eq(&course_code))
        .filter(enrollments::user_id.ne(user_id))
        .select(enrollments::user_id);

    let found = users::table
        .filter(users::id.eq_any(classmate_ids))
        .order(users::name)
        .load::<User>(&mut conn)
        .map_err(AppError::Database)?;
    Ok(Json(ApiResponse::ok(found)))
}
