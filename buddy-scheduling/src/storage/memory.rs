use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use uuid::Uuid;

use buddy_shared::errors::AppResult;

use crate::models::{
    AvailabilityWindow, ParticipantResponse, ParticipantRole, Session, SessionParticipant,
    SessionStatus,
};

use super::Store;

#[derive(Default)]
struct Inner {
    windows: HashMap<Uuid, AvailabilityWindow>,
    sessions: HashMap<Uuid, Session>,
    participants: Vec<SessionParticipant>,
    enrollments: Vec<(Uuid, String)>,
}

/// In-process store used by tests and local demo mode. A single `RwLock`
/// makes every port method atomic on its own; cross-call atomicity is the
/// negotiator's job.
#[derive(Default)]
pub struct MemStore {
    inner: RwLock<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_enrollment(&self, user_id: Uuid, course_code: &str) {
        let mut inner = self.inner.write().unwrap();
        let entry = (user_id, course_code.to_string());
        if !inner.enrollments.contains(&entry) {
            inner.enrollments.push(entry);
        }
    }

    /// Current state of a session, if it exists.
    pub fn session(&self, session_id: Uuid) -> Option<Session> {
        self.inner.read().unwrap().sessions.get(&session_id).cloned()
    }

    /// Inject a raw participant row, bypassing the two-party creation path.
    /// Used by tests exercising N-party sessions.
    #[cfg(test)]
    pub fn push_participant(&self, participant: SessionParticipant) {
        self.inner.write().unwrap().participants.push(participant);
    }
}

impl Store for MemStore {
    fn windows_for_user(&self, user_id: Uuid) -> AppResult<Vec<AvailabilityWindow>> {
        let inner = self.inner.read().unwrap();
        let mut windows: Vec<_> = inner
            .windows
            .values()
            .filter(|w| w.owner_id == user_id)
            .cloned()
            .collect();
        windows.sort_by_key(|w| (w.day_of_week, w.start_min));
        Ok(windows)
    }

    fn candidate_windows(
        &self,
        user_id: Uuid,
        course_code: &str,
    ) -> AppResult<Vec<AvailabilityWindow>> {
        let inner = self.inner.read().unwrap();
        let me_enrolled = inner
            .enrollments
            .iter()
            .any(|(u, c)| *u == user_id && c == course_code);
        if !me_enrolled {
            return Ok(Vec::new());
        }

        let mut windows: Vec<_> = inner
            .windows
            .values()
            .filter(|w| {
                w.owner_id != user_id
                    && inner
                        .enrollments
                        .iter()
                        .any(|(u, c)| *u == w.owner_id && c == course_code)
            })
            .cloned()
            .collect();
        windows.sort_by_key(|w| (w.day_of_week, w.start_min));
        Ok(windows)
    }

    fn insert_window(
        &self,
        owner_id: Uuid,
        day_of_week: i16,
        start_min: i32,
        end_min: i32,
    ) -> AppResult<AvailabilityWindow> {
        let window = AvailabilityWindow {
            id: Uuid::new_v4(),
            owner_id,
            day_of_week,
            start_min,
            end_min,
            created_at: Utc::now(),
        };
        self.inner
            .write()
            .unwrap()
            .windows
            .insert(window.id, window.clone());
        Ok(window)
    }

    fn delete_window(&self, window_id: Uuid) -> AppResult<bool> {
        Ok(self.inner.write().unwrap().windows.remove(&window_id).is_some())
    }

    fn create_session(
        &self,
        course_code: &str,
        day_of_week: i16,
        start_min: i32,
        end_min: i32,
        requester_id: Uuid,
        invitee_id: Uuid,
    ) -> AppResult<Session> {
        let session = Session {
            id: Uuid::new_v4(),
            course_code: course_code.to_string(),
            day_of_week,
            start_min,
            end_min,
            status: SessionStatus::Pending,
            created_at: Utc::now(),
        };

        // One write-lock scope, so the session and both participant rows
        // become visible together or not at all.
        let mut inner = self.inner.write().unwrap();
        inner.sessions.insert(session.id, session.clone());
        inner.participants.push(SessionParticipant {
            session_id: session.id,
            user_id: requester_id,
            role: ParticipantRole::Requester,
            response: ParticipantResponse::Accepted,
        });
        inner.participants.push(SessionParticipant {
            session_id: session.id,
            user_id: invitee_id,
            role: ParticipantRole::Invitee,
            response: ParticipantResponse::Pending,
        });
        Ok(session)
    }

    fn participants(&self, session_id: Uuid) -> AppResult<Vec<SessionParticipant>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .participants
            .iter()
            .filter(|p| p.session_id == session_id)
            .cloned()
            .collect())
    }

    fn set_participant_response(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        response: ParticipantResponse,
    ) -> AppResult<bool> {
        let mut inner = self.inner.write().unwrap();
        match inner
            .participants
            .iter_mut()
            .find(|p| p.session_id == session_id && p.user_id == user_id)
        {
            Some(participant) => {
                participant.response = response;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn set_session_status(&self, session_id: Uuid, status: SessionStatus) -> AppResult<()> {
        if let Some(session) = self.inner.write().unwrap().sessions.get_mut(&session_id) {
            session.status = status;
        }
        Ok(())
    }

    fn confirmed_sessions_for(&self, user_id: Uuid) -> AppResult<Vec<Session>> {
        let inner = self.inner.read().unwrap();
        let mut sessions: Vec<_> = inner
            .sessions
            .values()
            .filter(|s| {
                s.status == SessionStatus::Confirmed
                    && inner
                        .participants
                        .iter()
                        .any(|p| p.session_id == s.id && p.user_id == user_id)
            })
            .cloned()
            .collect();
        sessions.sort_by_key(|s| (s.day_of_week, s.start_min));
        Ok(sessions)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::suggest;

    #[test]
    fn candidate_windows_are_scoped_to_classmates() {
        let store = MemStore::new();
        let me = Uuid::new_v4();
        let classmate = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        store.add_enrollment(me, "CPSC-3720");
        store.add_enrollment(classmate, "CPSC-3720");
        store.add_enrollment(stranger, "MATH-1010");

        store.insert_window(me, 0, 780, 900).unwrap();
        let theirs = store.insert_window(classmate, 0, 840, 960).unwrap();
        store.insert_window(stranger, 0, 840, 960).unwrap();

        let candidates = store.candidate_windows(me, "CPSC-3720").unwrap();
        assert_eq!(candidates, vec![theirs]);
    }

    #[test]
    fn unenrolled_user_gets_no_candidates() {
        let store = MemStore::new();
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        store.add_enrollment(other, "CPSC-3720");
        store.insert_window(other, 0, 600, 720).unwrap();

        assert!(store.candidate_windows(me, "CPSC-3720").unwrap().is_empty());
    }

    #[test]
    fn deleting_a_window_removes_it_from_matching_input() {
        let store = MemStore::new();
        let me = Uuid::new_v4();
        let window = store.insert_window(me, 3, 600, 720).unwrap();
        assert_eq!(store.windows_for_user(me).unwrap().len(), 1);

        assert!(store.delete_window(window.id).unwrap());
        assert!(!store.delete_window(window.id).unwrap());
        assert!(store.windows_for_user(me).unwrap().is_empty());
    }

    #[test]
    fn suggest_path_through_the_port() {
        // The documented example, end to end: fetch both snapshots through
        // the port and run the matcher over them.
        let store = MemStore::new();
        let me = Uuid::new_v4();
        let partner = Uuid::new_v4();
        store.add_enrollment(me, "CPSC-3720");
        store.add_enrollment(partner, "CPSC-3720");
        store.insert_window(me, 0, 780, 900).unwrap(); // Mon 13:00-15:00
        store.insert_window(partner, 0, 840, 960).unwrap(); // Mon 14:00-16:00

        let mine = store.windows_for_user(me).unwrap();
        let candidates = store.candidate_windows(me, "CPSC-3720").unwrap();
        let suggestions = suggest::suggest_matches(&mine, &candidates, 30);

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].partner_id, partner);
        assert_eq!(suggestions[0].minutes, 60);
    }
}
