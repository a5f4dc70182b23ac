use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use uuid::Uuid;

use buddy_shared::errors::{AppError, AppResult};

use crate::models::{
    AvailabilityWindow, NewAvailability, NewParticipant, NewSession, ParticipantResponse,
    ParticipantRole, ParticipantRow, Session, SessionParticipant, SessionRow, SessionStatus,
};
use crate::schema::{availability, enrollments, session_participants, sessions};

use super::Store;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// Postgres-backed store. Multi-row units run inside a transaction so a
/// partial failure leaves nothing visible.
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> AppResult<PooledConnection<ConnectionManager<PgConnection>>> {
        self.pool
            .get()
            .map_err(|e| AppError::internal(format!("database connection error: {e}")))
    }
}

impl Store for PgStore {
    fn windows_for_user(&self, user_id: Uuid) -> AppResult<Vec<AvailabilityWindow>> {
        let mut conn = self.conn()?;
        availability::table
            .filter(availability::user_id.eq(user_id))
            .order((availability::day_of_week, availability::start_min))
            .load::<AvailabilityWindow>(&mut conn)
            .map_err(AppError::Database)
    }

    fn candidate_windows(
        &self,
        user_id: Uuid,
        course_code: &str,
    ) -> AppResult<Vec<AvailabilityWindow>> {
        let mut conn = self.conn()?;

        // Matching is scoped to courses the caller is actually enrolled in.
        let enrolled: i64 = enrollments::table
            .filter(enrollments::user_id.eq(user_id))
            .filter(enrollments::course_code.eq(course_code))
            .count()
            .get_result(&mut conn)
            .map_err(AppError::Database)?;
        if enrolled == 0 {
            return Ok(Vec::new());
        }

        let classmate_ids = enrollments::table
            .filter(enrollments::course_code.eq(course_code))
            .filter(enrollments::user_id.ne(user_id))
            .select(enrollments::user_id);

        availability::table
            .filter(availability::user_id.eq_any(classmate_ids))
            .order((availability::day_of_week, availability::start_min))
            .load::<AvailabilityWindow>(&mut conn)
            .map_err(AppError::Database)
    }

    fn insert_window(
        &self,
        owner_id: Uuid,
        day_of_week: i16,
        start_min: i32,
        end_min: i32,
    ) -> AppResult<AvailabilityWindow> {
        let mut conn = self.conn()?;
        diesel::insert_into(availability::table)
            .values(&NewAvailability {
                user_id: owner_id,
                day_of_week,
                start_min,
                end_min,
            })
            .get_result::<AvailabilityWindow>(&mut conn)
            .map_err(AppError::Database)
    }

    fn delete_window(&self, window_id: Uuid) -> AppResult<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(availability::table.find(window_id))
            .execute(&mut conn)
            .map_err(AppError::Database)?;
        Ok(deleted > 0)
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
        let mut conn = self.conn()?;

        let row = conn.transaction::<SessionRow, AppError, _>(|conn| {
            let row = diesel::insert_into(sessions::table)
                .values(&NewSession {
                    id: Uuid::new_v4(),
                    course_code: course_code.to_string(),
                    day_of_week,
                    start_min,
                    end_min,
                    status: SessionStatus::Pending.as_str().to_string(),
                })
                .get_result::<SessionRow>(conn)?;

            // Requesting is consenting: the requester's row is born accepted.
            diesel::insert_into(session_participants::table)
                .values(&NewParticipant {
                    session_id: row.id,
                    user_id: requester_id,
                    role: ParticipantRole::Requester.as_str().to_string(),
                    response: ParticipantResponse::Accepted.as_str().to_string(),
                })
                .execute(conn)?;

            diesel::insert_into(session_participants::table)
                .values(&NewParticipant {
                    session_id: row.id,
                    user_id: invitee_id,
                    role: ParticipantRole::Invitee.as_str().to_string(),
                    response: ParticipantResponse::Pending.as_str().to_string(),
                })
                .execute(conn)?;

            Ok(row)
        })?;

        Session::try_from(row)
    }

    fn participants(&self, session_id: Uuid) -> AppResult<Vec<SessionParticipant>> {
        let mut conn = self.conn()?;
        let rows = session_participants::table
            .filter(session_participants::session_id.eq(session_id))
            .load::<ParticipantRow>(&mut conn)
            .map_err(AppError::Database)?;
        rows.into_iter().map(SessionParticipant::try_from).collect()
    }

    fn set_participant_response(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        response: ParticipantResponse,
    ) -> AppResult<bool> {
        let mut conn = self.conn()?;
        let updated = diesel::update(
            session_participants::table
                .filter(session_participants::session_id.eq(session_id))
                .filter(session_participants::user_id.eq(user_id)),
        )
        .set(session_participants::response.eq(response.as_str()))
        .execute(&mut conn)
        .map_err(AppError::Database)?;
        Ok(updated > 0)
    }

    fn set_session_status(&self, session_id: Uuid, status: SessionStatus) -> AppResult<()> {
        let mut conn = self.conn()?;
        diesel::update(sessions::table.find(session_id))
            .set(sessions::status.eq(status.as_str()))
            .execute(&mut conn)
            .map_err(AppError::Database)?;
        Ok(())
    }

    fn confirmed_sessions_for(&self, user_id: Uuid) -> AppResult<Vec<Session>> {
        let mut conn = self.conn()?;
        let rows = sessions::table
            .inner_join(session_participants::table)
            .filter(session_participants::user_id.eq(user_id))
            .filter(sessions::status.eq(SessionStatus::Confirmed.as_str()))
            .order((sessions::day_of_week, sessions::start_min))
            .select(sessions::all_columns)
            .load::<SessionRow>(&mut conn)
            .map_err(AppError::Database)?;
        rows.into_iter().map(Session::try_from).collect()
    }
}
