//! Session negotiation state machine.
//!
//! A session starts `pending` with the requester already accepted and the
//! invitee pending. Responses drive the status: one decline makes the session
//! `declined` immediately and permanently; the session becomes `confirmed`
//! the moment every participant row reads `accepted`. The unanimity check
//! scans all rows, so the machine works unchanged for N participants even
//! though the creation path makes two.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use buddy_shared::errors::{AppError, AppResult, ErrorCode};

use crate::matching::interval;
use crate::models::{ParticipantResponse, Session, SessionStatus};
use crate::storage::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Decline,
}

pub struct SessionNegotiator {
    store: Arc<dyn Store>,
    /// One lock per session id. `respond`'s write-read-decide sequence runs
    /// under it so a decline can never be overwritten by a racing accept's
    /// confirmation check, and the unanimity scan always sees the caller's
    /// own write. Distinct sessions proceed in parallel.
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl SessionNegotiator {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn session_lock(&self, session_id: Uuid) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .unwrap()
            .entry(session_id)
            .or_default()
            .clone()
    }

    /// Create a session in `pending` with both participant rows.
    ///
    /// The window is validated before anything is written; an invalid range
    /// fails with no partial state.
    pub fn create(
        &self,
        requester_id: Uuid,
        invitee_id: Uuid,
        course_code: &str,
        day_of_week: i16,
        start_min: i32,
        end_min: i32,
    ) -> AppResult<Session> {
        interval::validate_window(day_of_week, start_min, end_min)?;

        let session = self.store.create_session(
            course_code,
            day_of_week,
            start_min,
            end_min,
            requester_id,
            invitee_id,
        )?;
        tracing::info!(
            session_id = %session.id,
            requester = %requester_id,
            invitee = %invitee_id,
            course = course_code,
            "session requested"
        );
        Ok(session)
    }

    /// Record one participant's decision and derive the session status.
    ///
    /// Returns the status the session holds after this call. Responding to a
    /// session that has already been declined is rejected; there is no path
    /// past the declining transition.
    pub fn respond(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        decision: Decision,
    ) -> AppResult<SessionStatus> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().unwrap();

        let participants = self.store.participants(session_id)?;
        if participants.is_empty() {
            return Err(AppError::new(ErrorCode::SessionNotFound, "session not found"));
        }
        if !participants.iter().any(|p| p.user_id == user_id) {
            return Err(AppError::new(
                ErrorCode::ParticipantNotFound,
                "user is not a participant in this session",
            ));
        }
        if participants
            .iter()
            .any(|p| p.response == ParticipantResponse::Declined)
        {
            return Err(AppError::new(
                ErrorCode::SessionClosed,
                "session has already been declined",
            ));
        }

        match decision {
            Decision::Decline => {
                self.store.set_participant_response(
                    session_id,
                    user_id,
                    ParticipantResponse::Declined,
                )?;
                // One decline is terminal, whatever anyone else said.
                self.store
                    .set_session_status(session_id, SessionStatus::Declined)?;
                tracing::info!(session_id = %session_id, user = %user_id, "session declined");
                Ok(SessionStatus::Declined)
            }
            Decision::Accept => {
                self.store.set_participant_response(
                    session_id,
                    user_id,
                    ParticipantResponse::Accepted,
                )?;
                // Re-read under the lock: the snapshot must include the write
                // above before the unanimity check means anything.
                let participants = self.store.participants(session_id)?;
                let all_accepted = participants
                    .iter()
                    .all(|p| p.response == ParticipantResponse::Accepted);
                if all_accepted {
                    self.store
                        .set_session_status(session_id, SessionStatus::Confirmed)?;
                    tracing::info!(session_id = %session_id, "session confirmed");
                    Ok(SessionStatus::Confirmed)
                } else {
                    Ok(SessionStatus::Pending)
                }
            }
        }
    }

    /// Confirmed sessions for a user, ordered by `(day_of_week, start_min)`.
    pub fn list_confirmed(&self, user_id: Uuid) -> AppResult<Vec<Session>> {
        self.store.confirmed_sessions_for(user_id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemStore;

    fn setup() -> (Arc<MemStore>, SessionNegotiator) {
        let store = Arc::new(MemStore::new());
        let negotiator = SessionNegotiator::new(store.clone());
        (store, negotiator)
    }

    #[test]
    fn create_starts_pending_with_requester_accepted() {
        let (store, negotiator) = setup();
        let requester = Uuid::new_v4();
        let invitee = Uuid::new_v4();

        let session = negotiator
            .create(requester, invitee, "CPSC-3720", 0, 780, 900)
            .unwrap();
        assert_eq!(session.status, SessionStatus::Pending);

        let participants = store.participants(session.id).unwrap();
        assert_eq!(participants.len(), 2);
        let req = participants.iter().find(|p| p.user_id == requester).unwrap();
        assert_eq!(req.response, ParticipantResponse::Accepted);
        let inv = participants.iter().find(|p| p.user_id == invitee).unwrap();
        assert_eq!(inv.response, ParticipantResponse::Pending);
    }

    #[test]
    fn invalid_range_creates_nothing() {
        let (store, negotiator) = setup();
        let requester = Uuid::new_v4();
        let invitee = Uuid::new_v4();

        let err = negotiator
            .create(requester, invitee, "CPSC-3720", 7, 0, 60)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRange);

        let err = negotiator
            .create(requester, invitee, "CPSC-3720", 0, 600, 600)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRange);

        // Validate-before-persist: no session or participant rows exist.
        assert!(store.confirmed_sessions_for(requester).unwrap().is_empty());
        assert!(store.participants(Uuid::new_v4()).unwrap().is_empty());
    }

    #[test]
    fn invitee_accept_confirms() {
        let (store, negotiator) = setup();
        let requester = Uuid::new_v4();
        let invitee = Uuid::new_v4();
        let session = negotiator
            .create(requester, invitee, "CPSC-3720", 2, 600, 720)
            .unwrap();

        let status = negotiator
            .respond(session.id, invitee, Decision::Accept)
            .unwrap();
        assert_eq!(status, SessionStatus::Confirmed);
        assert_eq!(
            store.session(session.id).unwrap().status,
            SessionStatus::Confirmed
        );
    }

    #[test]
    fn decline_wins_over_prior_accept() {
        let (store, negotiator) = setup();
        let requester = Uuid::new_v4();
        let invitee = Uuid::new_v4();
        let session = negotiator
            .create(requester, invitee, "CPSC-3720", 2, 600, 720)
            .unwrap();

        // Requester's row is already accepted; one decline still kills it.
        let status = negotiator
            .respond(session.id, invitee, Decision::Decline)
            .unwrap();
        assert_eq!(status, SessionStatus::Declined);
        assert_eq!(
            store.session(session.id).unwrap().status,
            SessionStatus::Declined
        );
    }

    #[test]
    fn declined_session_is_sticky() {
        let (store, negotiator) = setup();
        let requester = Uuid::new_v4();
        let invitee = Uuid::new_v4();
        let session = negotiator
            .create(requester, invitee, "CPSC-3720", 2, 600, 720)
            .unwrap();

        negotiator
            .respond(session.id, invitee, Decision::Decline)
            .unwrap();

        // Nobody can respond past the declining transition, not even the
        // decliner changing their mind.
        let err = negotiator
            .respond(session.id, invitee, Decision::Accept)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::SessionClosed);
        let err = negotiator
            .respond(session.id, requester, Decision::Accept)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::SessionClosed);

        assert_eq!(
            store.session(session.id).unwrap().status,
            SessionStatus::Declined
        );
    }

    #[test]
    fn unknown_session_and_participant_are_not_found() {
        let (_store, negotiator) = setup();
        let requester = Uuid::new_v4();
        let invitee = Uuid::new_v4();

        let err = negotiator
            .respond(Uuid::new_v4(), requester, Decision::Accept)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::SessionNotFound);

        let session = negotiator
            .create(requester, invitee, "CPSC-3720", 1, 540, 660)
            .unwrap();
        let outsider = Uuid::new_v4();
        let err = negotiator
            .respond(session.id, outsider, Decision::Accept)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ParticipantNotFound);
    }

    #[test]
    fn list_confirmed_is_ordered_by_day_then_start() {
        let (_store, negotiator) = setup();
        let requester = Uuid::new_v4();
        let invitee = Uuid::new_v4();

        // Created out of order on purpose.
        let fri = negotiator
            .create(requester, invitee, "CPSC-3720", 4, 600, 720)
            .unwrap();
        let mon_late = negotiator
            .create(requester, invitee, "CPSC-3720", 0, 900, 960)
            .unwrap();
        let mon_early = negotiator
            .create(requester, invitee, "CPSC-3720", 0, 540, 600)
            .unwrap();
        for session in [&fri, &mon_late, &mon_early] {
            negotiator
                .respond(session.id, invitee, Decision::Accept)
                .unwrap();
        }

        let confirmed = negotiator.list_confirmed(requester).unwrap();
        let ids: Vec<_> = confirmed.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![mon_early.id, mon_late.id, fri.id]);

        // An uninvolved user sees nothing.
        assert!(negotiator.list_confirmed(Uuid::new_v4()).unwrap().is_empty());
    }

    #[test]
    fn n_party_unanimity_requires_every_participant() {
        // The creation path makes two participants, but the state machine
        // scans all rows; widen a session by hand and check unanimity.
        let (store, negotiator) = setup();
        let requester = Uuid::new_v4();
        let invitee_a = Uuid::new_v4();
        let invitee_b = Uuid::new_v4();
        let session = negotiator
            .create(requester, invitee_a, "CPSC-3720", 3, 600, 720)
            .unwrap();

        // Widen the session with a third participant row; the schema puts no
        // cap on participants per session.
        let third = crate::models::SessionParticipant {
            session_id: session.id,
            user_id: invitee_b,
            role: crate::models::ParticipantRole::Invitee,
            response: ParticipantResponse::Pending,
        };
        store.push_participant(third);

        let status = negotiator
            .respond(session.id, invitee_a, Decision::Accept)
            .unwrap();
        assert_eq!(status, SessionStatus::Pending);

        let status = negotiator
            .respond(session.id, invitee_b, Decision::Accept)
            .unwrap();
        assert_eq!(status, SessionStatus::Confirmed);
    }

    #[test]
    fn racing_accept_and_decline_always_end_declined() {
        // Two concurrent responders, one accepting and one declining, must
        // leave the session declined in every interleaving.
        for _ in 0..50 {
            let (store, negotiator) = setup();
            let negotiator = Arc::new(negotiator);
            let requester = Uuid::new_v4();
            let invitee_a = Uuid::new_v4();
            let invitee_b = Uuid::new_v4();
            let session = negotiator
                .create(requester, invitee_a, "CPSC-3720", 5, 600, 720)
                .unwrap();
            store.push_participant(crate::models::SessionParticipant {
                session_id: session.id,
                user_id: invitee_b,
                role: crate::models::ParticipantRole::Invitee,
                response: ParticipantResponse::Pending,
            });

            let accepter = {
                let negotiator = negotiator.clone();
                let sid = session.id;
                std::thread::spawn(move || negotiator.respond(sid, invitee_a, Decision::Accept))
            };
            let decliner = {
                let negotiator = negotiator.clone();
                let sid = session.id;
                std::thread::spawn(move || negotiator.respond(sid, invitee_b, Decision::Decline))
            };

            // The accept may be rejected when it lands after the decline;
            // what matters is the final status.
            let _ = accepter.join().unwrap();
            let _ = decliner.join().unwrap();

            assert_eq!(
                store.session(session.id).unwrap().status,
                SessionStatus::Declined
            );
        }
    }
}
