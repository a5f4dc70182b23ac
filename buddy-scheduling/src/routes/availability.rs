use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use buddy_shared::errors::{AppError, AppResult, ErrorCode};
use buddy_shared::types::ApiResponse;

use crate::matching::interval;
use crate::models::AvailabilityWindow;
use crate::storage::Store;
use crate::timeslot;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AddWindowPayload {
    /// `"<Dow> HH:MM-HH:MM"`, e.g. `"Mon 13:00-15:30"`.
    pub window: String,
}

#[derive(Debug, Serialize)]
pub struct WindowView {
    #[serde(flatten)]
    pub window: AvailabilityWindow,
    pub label: String,
}

impl From<AvailabilityWindow> for WindowView {
    fn from(window: AvailabilityWindow) -> Self {
        let label = timeslot::format_range(window.day_of_week, window.start_min, window.end_min);
        Self { window, label }
    }
}

// --- POST /users/:id/availability ---

pub async fn add_window(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<AddWindowPayload>,
) -> AppResult<Json<ApiResponse<WindowView>>> {
    let (day_of_week, start_min, end_min) = timeslot::parse_range(&payload.window)?;
    interval::validate_window(day_of_week, start_min, end_min)?;

    let window = state
        .store
        .insert_window(user_id, day_of_week, start_min, end_min)?;
    tracing::info!(user_id = %user_id, window_id = %window.id, "availability window added");
    Ok(Json(ApiResponse::ok(window.into())))
}

// --- GET /users/:id/availability ---

pub async fn list_windows(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<WindowView>>>> {
    let windows = state.store.windows_for_user(user_id)?;
    Ok(Json(ApiResponse::ok(
        windows.into_iter().map(WindowView::from).collect(),
    )))
}

// --- DELETE /availability/:id ---

pub async fn remove_window(
    State(state): State<Arc<AppState>>,
    Path(window_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Uuid>>> {
    if !state.store.delete_window(window_id)? {
        return Err(AppError::new(
            ErrorCode::AvailabilityNotFound,
            "availability window not found",
        ));
    }
    Ok(Json(ApiResponse::ok(window_id)))
}
