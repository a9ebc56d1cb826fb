// SPDX-License-Identifier: MIT

//! Admin API routes: session creation, marking on behalf of students,
//! recap, CSV export, and role management.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::sse::{Event, KeepAlive, Sse},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use futures_util::stream::Stream;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{
    attendance_doc_id, AttendanceRecord, AttendanceStatus, GeoPoint, Role, Session, UserProfile,
};
use crate::services::recap::{build_recap, export_csv, Recap};
use crate::time_utils::now_iso;
use crate::AppState;

use super::api::{session_response, SessionResponse};

/// How many sessions the admin dashboard sees.
const ADMIN_SESSION_LIMIT: u32 = 30;
/// Poll interval behind the recap SSE stream.
const RECAP_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Admin routes (require authentication and an admin-resolved role).
/// Both middlewares are applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/sessions", post(create_session).get(list_sessions))
        .route("/api/admin/students", get(list_students))
        .route("/api/admin/attendance", post(admin_mark))
        .route("/api/admin/recap", get(get_recap))
        .route("/api/admin/recap/stream", get(recap_stream))
        .route("/api/admin/export", get(export_attendance_csv))
        .route("/api/admin/users/{uid}/role", put(set_role))
}

// ─── Session Creation ────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    /// Scheduled date/time, RFC 3339
    pub date: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub note: Option<String>,
}

/// Create a practice session.
///
/// Missing coordinates default to the campus location; the radius is
/// always the configured default. Sessions are immutable once created.
async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<Json<SessionResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let title = payload.title.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }

    let date = chrono::DateTime::parse_from_rfc3339(&payload.date)
        .map_err(|_| AppError::BadRequest("Invalid 'date': must be RFC3339 datetime".to_string()))?
        .with_timezone(&chrono::Utc);

    let location = match (payload.lat, payload.lng) {
        (Some(lat), Some(lng)) => {
            if !lat.is_finite() || !lng.is_finite() {
                return Err(AppError::BadRequest(
                    "Location coordinates must be finite".to_string(),
                ));
            }
            GeoPoint { lat, lng }
        }
        (None, None) => state.config.campus_location,
        _ => {
            return Err(AppError::BadRequest(
                "Provide both lat and lng, or neither".to_string(),
            ))
        }
    };

    let note = payload
        .note
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    let session = Session {
        id: String::new(), // assigned by the store layer
        title: title.to_string(),
        date: crate::time_utils::format_iso_millis(date),
        location: Some(location),
        radius_meters: Some(state.config.default_radius_meters),
        note,
        created_at: now_iso(),
    };

    let session = state.db.create_session(session).await?;

    tracing::info!(
        session_id = %session.id,
        title = %session.title,
        lat = location.lat,
        lng = location.lng,
        "Session created"
    );

    Ok(Json(session_response(&session, &state)))
}

/// List recent sessions for the admin dashboard.
async fn list_sessions(State(state): State<Arc<AppState>>) -> Result<Json<Vec<SessionResponse>>> {
    let sessions = state.db.list_sessions(ADMIN_SESSION_LIMIT).await?;
    Ok(Json(
        sessions.iter().map(|s| session_response(s, &state)).collect(),
    ))
}

// ─── Roster ──────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StudentResponse {
    pub uid: String,
    pub name: String,
    pub email: Option<String>,
    pub cohort_year: Option<i32>,
}

fn student_response(profile: &UserProfile) -> StudentResponse {
    StudentResponse {
        uid: profile.uid.clone(),
        name: profile.name.clone(),
        email: profile.email.clone(),
        cohort_year: profile.cohort_year,
    }
}

/// List the student roster (non-deleted, non-admin).
async fn list_students(State(state): State<Arc<AppState>>) -> Result<Json<Vec<StudentResponse>>> {
    let students = state.db.list_students().await?;
    Ok(Json(students.iter().map(student_response).collect()))
}

// ─── Mark On Behalf ──────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct AdminMarkRequest {
    #[validate(length(min = 1, message = "session_id is required"))]
    pub session_id: String,
    #[validate(length(min = 1, message = "uid is required"))]
    pub uid: String,
    pub status: AttendanceStatus,
    pub reason: Option<String>,
}

/// Mark attendance on behalf of a student.
///
/// Shares the composite-key upsert with student self-service; the admin
/// path records no geolocation, matching the original override flow.
async fn admin_mark(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AdminMarkRequest>,
) -> Result<Json<AttendanceRecord>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let reason = match payload.status {
        AttendanceStatus::Excused => {
            let reason = payload.reason.as_deref().unwrap_or("").trim();
            if reason.len() < 3 {
                return Err(AppError::BadRequest(
                    "Excuse reason must be at least 3 characters".to_string(),
                ));
            }
            Some(reason.to_string())
        }
        AttendanceStatus::Present => None,
    };

    let session = state
        .db
        .get_session(&payload.session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", payload.session_id)))?;

    let student = state
        .db
        .get_profile(&payload.uid)
        .await?
        .filter(|p| !p.is_deleted())
        .ok_or_else(|| AppError::NotFound(format!("Student {} not found", payload.uid)))?;

    let record = AttendanceRecord {
        id: attendance_doc_id(&session.id, &student.uid),
        session_id: session.id.clone(),
        uid: student.uid.clone(),
        name: student.name.clone(),
        status: payload.status,
        reason,
        geo: None,
        created_at: Some(now_iso()),
    };

    state.db.upsert_attendance(&record).await?;

    tracing::info!(
        session_id = %session.id,
        uid = %student.uid,
        status = ?payload.status,
        "Attendance marked by admin"
    );

    Ok(Json(record))
}

// ─── Recap ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct RecapQuery {
    session_id: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RecapEntry {
    pub uid: String,
    pub name: String,
    pub reason: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RecapResponse {
    pub session_id: String,
    pub present: Vec<RecapEntry>,
    pub excused: Vec<RecapEntry>,
    pub not_marked: Vec<RecapEntry>,
}

fn recap_response(session_id: &str, recap: Recap) -> RecapResponse {
    let attendance_entry = |a: &AttendanceRecord| RecapEntry {
        uid: a.uid.clone(),
        name: a.name.clone(),
        reason: a.reason.clone(),
    };

    RecapResponse {
        session_id: session_id.to_string(),
        present: recap.present.iter().map(attendance_entry).collect(),
        excused: recap.excused.iter().map(attendance_entry).collect(),
        not_marked: recap
            .not_marked
            .iter()
            .map(|u| RecapEntry {
                uid: u.uid.clone(),
                name: u.name.clone(),
                reason: None,
            })
            .collect(),
    }
}

/// Present / excused / not-yet-marked partition for a session.
async fn get_recap(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecapQuery>,
) -> Result<Json<RecapResponse>> {
    let session = state
        .db
        .get_session(&params.session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", params.session_id)))?;

    let attendance = state.db.list_attendance_for_session(&session.id).await?;
    let roster = state.db.list_students().await?;

    Ok(Json(recap_response(
        &session.id,
        build_recap(&attendance, &roster),
    )))
}

/// Live recap updates over SSE.
///
/// Backed by a polling subscription on the session; the subscription is
/// owned by the stream and torn down when the client disconnects.
async fn recap_stream(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecapQuery>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let session = state
        .db
        .get_session(&params.session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", params.session_id)))?;

    let watch = state.db.watch_session(&session.id, RECAP_POLL_INTERVAL);
    let session_id = session.id;

    let stream = futures_util::stream::unfold(
        (watch, session_id),
        |(mut watch, session_id)| async move {
            let snapshot = watch.next().await?;
            let recap = build_recap(&snapshot.attendance, &snapshot.roster);
            let event = Event::default()
                .event("recap")
                .json_data(recap_response(&session_id, recap))
                .ok()?;
            Some((Ok(event), (watch, session_id)))
        },
    );

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

// ─── CSV Export ──────────────────────────────────────────────

/// Export a session's attendance as CSV.
async fn export_attendance_csv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecapQuery>,
) -> Result<impl IntoResponse> {
    let session = state
        .db
        .get_session(&params.session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", params.session_id)))?;

    let attendance = state.db.list_attendance_for_session(&session.id).await?;
    let csv = export_csv(&attendance);

    tracing::info!(session_id = %session.id, rows = attendance.len(), "CSV export");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv;charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"attendance_{}.csv\"", session.id),
            ),
        ],
        csv,
    ))
}

// ─── Role Management ─────────────────────────────────────────

#[derive(Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SetRoleResponse {
    pub uid: String,
    pub role: Role,
}

/// Flip a user's role between student and admin.
async fn set_role(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
    Json(payload): Json<SetRoleRequest>,
) -> Result<Json<SetRoleResponse>> {
    let role = match payload.role.trim().to_ascii_lowercase().as_str() {
        "admin" => Role::Admin,
        "student" => Role::Student,
        other => {
            return Err(AppError::BadRequest(format!(
                "Unknown role '{}': expected 'student' or 'admin'",
                other
            )))
        }
    };

    let profile = state.db.set_role(&uid, role.as_str()).await?;

    tracing::info!(uid = %uid, role = %role, "Role changed");

    Ok(Json(SetRoleResponse {
        uid: profile.uid,
        role,
    }))
}
