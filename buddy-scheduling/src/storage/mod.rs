//! Storage port consumed by the matching and negotiation core.
//!
//! The core never issues queries beyond this trait; `PgStore` backs it with
//! Postgres and `MemStore` keeps everything in process for tests and local
//! demos. Errors from an implementation propagate unmodified; the core does
//! not retry.

mod memory;
mod pg;

pub use memory::MemStore;
pub use pg::{DbPool, PgStore};

use uuid::Uuid;

use buddy_shared::errors::AppResult;

use crate::models::{
    AvailabilityWindow, ParticipantResponse, Session, SessionParticipant, SessionStatus,
};

pub trait Store: Send + Sync {
    /// All availability windows owned by a user.
    fn windows_for_user(&self, user_id: Uuid) -> AppResult<Vec<AvailabilityWindow>>;

    /// Windows of everyone co-enrolled with `user_id` in `course_code`,
    /// excluding the user's own. Empty when the user is not enrolled.
    fn candidate_windows(
        &self,
        user_id: Uuid,
        course_code: &str,
    ) -> AppResult<Vec<AvailabilityWindow>>;

    /// Persist a pre-validated window and return it.
    fn insert_window(
        &self,
        owner_id: Uuid,
        day_of_week: i16,
        start_min: i32,
        end_min: i32,
    ) -> AppResult<AvailabilityWindow>;

    /// Delete a window; false when no such window existed.
    fn delete_window(&self, window_id: Uuid) -> AppResult<bool>;

    /// Create a pending session together with its requester (accepted) and
    /// invitee (pending) participant rows as one atomic unit. If any row
    /// cannot be written, none are visible.
    fn create_session(
        &self,
        course_code: &str,
        day_of_week: i16,
        start_min: i32,
        end_min: i32,
        requester_id: Uuid,
        invitee_id: Uuid,
    ) -> AppResult<Session>;

    /// All participant rows for a session; empty when the session is unknown.
    fn participants(&self, session_id: Uuid) -> AppResult<Vec<SessionParticipant>>;

    /// Set one participant's response; false when no such row exists.
    fn set_participant_response(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        response: ParticipantResponse,
    ) -> AppResult<bool>;

    fn set_session_status(&self, session_id: Uuid, status: SessionStatus) -> AppResult<()>;

    /// Confirmed sessions the user participates in, ordered by
    /// `(day_of_week, start_min)` ascending.
    fn confirmed_sessions_for(&self, user_id: Uuid) -> AppResult<Vec<Session>>;
}
