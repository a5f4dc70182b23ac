use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use buddy_shared::errors::{AppError, AppResult};
use buddy_shared::types::ApiResponse;

use crate::matching::suggest;
use crate::models::MatchSuggestion;
use crate::storage::Store;
use crate::timeslot;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MatchQuery {
    /// Minimum overlap worth suggesting; defaults from service config.
    pub min_minutes: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionView {
    #[serde(flatten)]
    pub suggestion: MatchSuggestion,
    pub label: String,
}

impl From<MatchSuggestion> for SuggestionView {
    fn from(suggestion: MatchSuggestion) -> Self {
        let label = timeslot::format_range(
            suggestion.day_of_week,
            suggestion.overlap_start_min,
            suggestion.overlap_end_min,
        );
        Self { suggestion, label }
    }
}

// --- GET /users/:id/matches/:course_code ---

/// Ranked study-partner suggestions: every overlapping window pair between
/// the user and their classmates in the course, longest overlap first.
pub async fn suggest_matches(
    State(state): State<Arc<AppState>>,
    Path((user_id, course_code)): Path<(Uuid, String)>,
    Query(query): Query<MatchQuery>,
) -> AppResult<Json<ApiResponse<Vec<SuggestionView>>>> {
    let min_minutes = query.min_minutes.unwrap_or(state.config.min_match_minutes);
    if min_minutes < 0 {
        return Err(AppError::Validation("min_minutes must be >= 0".into()));
    }

    let mine = state.store.windows_for_user(user_id)?;
    let candidates = state.store.candidate_windows(user_id, &course_code)?;
    let suggestions = suggest::suggest_matches(&mine, &candidates, min_minutes);

    tracing::debug!(
        user_id = %user_id,
        course = %course_code,
        count = suggestions.len(),
        "match suggestions computed"
    );
    Ok(Json(ApiResponse::ok(
        suggestions.into_iter().map(SuggestionView::from).collect(),
    )))
}
