use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use buddy_shared::errors::{AppError, AppResult};
use buddy_shared::types::ApiResponse;

use crate::models::{Session, SessionStatus};
use crate::sessions::Decision;
use crate::timeslot;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RequestSessionPayload {
    pub requester_id: Uuid,
    pub invitee_id: Uuid,
    pub course_code: String,
    /// `"<Dow> HH:MM-HH:MM"`, e.g. `"Wed 10:00-11:00"`.
    pub window: String,
}

#[derive(Debug, Deserialize)]
pub struct RespondSessionPayload {
    pub user_id: Uuid,
    pub accept: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: Session,
    pub label: String,
}

impl From<Session> for SessionView {
    fn from(session: Session) -> Self {
        let label =
            timeslot::format_range(session.day_of_week, session.start_min, session.end_min);
        Self { session, label }
    }
}

#[derive(Debug, Serialize)]
pub struct RespondOutcome {
    pub session_id: Uuid,
    pub status: SessionStatus,
}

// --- POST /sessions ---

pub async fn request_session(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RequestSessionPayload>,
) -> AppResult<Json<ApiResponse<SessionView>>> {
    if payload.requester_id == payload.invitee_id {
        return Err(AppError::bad_request("cannot request a session with yourself"));
    }
    let (day_of_week, start_min, end_min) = timeslot::parse_range(&payload.window)?;

    let session = state.negotiator.create(
        payload.requester_id,
        payload.invitee_id,
        &payload.course_code,
        day_of_week,
        start_min,
        end_min,
    )?;
    Ok(Json(ApiResponse::ok(session.into())))
}

// --- PUT /sessions/:id/respond ---

pub async fn respond_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<RespondSessionPayload>,
) -> AppResult<Json<ApiResponse<RespondOutcome>>> {
    let decision = if payload.accept {
        Decision::Accept
    } else {
        Decision::Decline
    };
    let status = state
        .negotiator
        .respond(session_id, payload.user_id, decision)?;
    Ok(Json(ApiResponse::ok(RespondOutcome { session_id, status })))
}

// --- GET /users/:id/sessions/confirmed ---

pub async fn list_confirmed_sessions(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<SessionView>>>> {
    let confirmed = state.negotiator.list_confirmed(user_id)?;
    Ok(Json(ApiResponse::ok(
        confirmed.into_iter().map(SessionView::from).collect(),
    )))
}
