use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use buddy_shared::errors::AppError;

use crate::schema::{availability, courses, enrollments, session_participants, sessions, users};

// ---------------------------------------------------------------------------
// Status / role / response tokens
//
// Stored as lowercase varchar columns; converted to closed enums at the
// storage boundary so every transition site matches exhaustively. An unknown
// token coming back from the database is corruption, not a default.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Confirmed,
    Declined,
    /// Reserved terminal state. Nothing in this service sets it; an external
    /// moderation path may.
    Canceled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Declined => "declined",
            Self::Canceled => "canceled",
        }
    }

    /// Terminal states never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Declined | Self::Canceled)
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "declined" => Ok(Self::Declined),
            "canceled" => Ok(Self::Canceled),
            other => Err(format!("unknown session status token: {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Requester,
    Invitee,
}

impl ParticipantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requester => "requester",
            Self::Invitee => "invitee",
        }
    }
}

impl FromStr for ParticipantRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "requester" => Ok(Self::Requester),
            "invitee" => Ok(Self::Invitee),
            other => Err(format!("unknown participant role token: {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantResponse {
    Accepted,
    Pending,
    Declined,
}

impl ParticipantResponse {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Pending => "pending",
            Self::Declined => "declined",
        }
    }
}

impl FromStr for ParticipantResponse {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accepted" => Ok(Self::Accepted),
            "pending" => Ok(Self::Pending),
            "declined" => Ok(Self::Declined),
            other => Err(format!("unknown participant response token: {other:?}")),
        }
    }
}

// --- User ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub name: String,
}

// --- Course / Enrollment ---

#[derive(Debug, Queryable, Serialize, Clone)]
#[diesel(table_name = courses)]
pub struct Course {
    pub code: String,
    pub title: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = courses)]
pub struct NewCourse {
    pub code: String,
    pub title: Option<String>,
}

#[derive(Debug, Queryable, Insertable, Serialize, Clone)]
#[diesel(table_name = enrollments)]
pub struct Enrollment {
    pub user_id: Uuid,
    pub course_code: String,
}

// --- AvailabilityWindow ---

/// One weekly availability block, a half-open interval `[start_min, end_min)`
/// in minutes since midnight on `day_of_week` (0=Mon .. 6=Sun).
///
/// Windows are created and deleted whole; there is no in-place edit and no
/// merging of a user's overlapping windows. Each row is independent input to
/// the matcher.
#[derive(Debug, Queryable, Identifiable, Serialize, Clone, PartialEq)]
#[diesel(table_name = availability)]
pub struct AvailabilityWindow {
    pub id: Uuid,
    // Maps positionally onto the `user_id` column.
    pub owner_id: Uuid,
    pub day_of_week: i16,
    pub start_min: i32,
    pub end_min: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = availability)]
pub struct NewAvailability {
    pub user_id: Uuid,
    pub day_of_week: i16,
    pub start_min: i32,
    pub end_min: i32,
}

// --- MatchSuggestion ---

/// A suggested study partner and the exact overlap of one window pair.
/// Computed on every query, never persisted.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct MatchSuggestion {
    pub partner_id: Uuid,
    pub day_of_week: i16,
    pub overlap_start_min: i32,
    pub overlap_end_min: i32,
    pub minutes: i32,
}

// --- Session ---

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub course_code: String,
    pub day_of_week: i16,
    pub start_min: i32,
    pub end_min: i32,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

/// Raw row as stored; `status` is still a token.
#[derive(Debug, Queryable, Identifiable)]
#[diesel(table_name = sessions)]
pub struct SessionRow {
    pub id: Uuid,
    pub course_code: String,
    pub day_of_week: i16,
    pub start_min: i32,
    pub end_min: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for Session {
    type Error = AppError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(AppError::internal)?;
        Ok(Session {
            id: row.id,
            course_code: row.course_code,
            day_of_week: row.day_of_week,
            start_min: row.start_min,
            end_min: row.end_min,
            status,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sessions)]
pub struct NewSession {
    pub id: Uuid,
    pub course_code: String,
    pub day_of_week: i16,
    pub start_min: i32,
    pub end_min: i32,
    pub status: String,
}

// --- SessionParticipant ---

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct SessionParticipant {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub role: ParticipantRole,
    pub response: ParticipantResponse,
}

#[derive(Debug, Queryable)]
#[diesel(table_name = session_participants)]
pub struct ParticipantRow {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub response: String,
}

impl TryFrom<ParticipantRow> for SessionParticipant {
    type Error = AppError;

    fn try_from(row: ParticipantRow) -> Result<Self, Self::Error> {
        let role = row.role.parse().map_err(AppError::internal)?;
        let response = row.response.parse().map_err(AppError::internal)?;
        Ok(SessionParticipant {
            session_id: row.session_id,
            user_id: row.user_id,
            role,
            response,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = session_participants)]
pub struct NewParticipant {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub response: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
