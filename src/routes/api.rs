// SPDX-License-Identifier: MIT

//! Student-facing API routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    attendance_doc_id, choose_active_session, AttendanceRecord, AttendanceStatus, GeoPoint,
    GeoReading, Role, Session, UserProfile,
};
use crate::services::{classof, gate, geofence, ClassLevel};
use crate::time_utils::now_iso;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// How many sessions the student dashboard sees.
const STUDENT_SESSION_LIMIT: u32 = 20;
/// How many history entries the student keeps.
const HISTORY_LIMIT: u32 = 5;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/onboarding", post(post_onboarding))
        .route("/api/sessions", get(get_sessions))
        .route("/api/attendance/me", get(get_my_attendance))
        .route("/api/attendance/present", post(mark_present))
        .route("/api/attendance/excused", post(mark_excused))
        .route("/api/attendance/history", get(get_history))
}

// ─── Current User ────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileResponse {
    pub name: String,
    pub email: Option<String>,
    pub cohort_year: Option<i32>,
    pub class_level: Option<ClassLevel>,
}

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MeResponse {
    pub uid: String,
    pub role: Role,
    /// Present unless the user still needs onboarding or the profile
    /// read failed
    pub profile: Option<ProfileResponse>,
    /// True when no profile document exists yet
    pub onboarding_required: bool,
    /// Dashboard path the client should navigate to
    pub redirect_to: String,
}

#[derive(Deserialize, Default)]
struct MeQuery {
    /// Current client path, for the route guard
    #[serde(default)]
    path: Option<String>,
}

/// Get current user profile, resolved role, and routing decision.
///
/// A failed profile read resolves to the student role instead of an
/// error, so a degraded store never locks the user out of the student
/// view.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<MeQuery>,
) -> Result<Json<MeResponse>> {
    let profile = match state.db.get_profile_bounded(&user.uid).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(uid = %user.uid, error = %e, "Profile read failed, defaulting to student");
            return Ok(Json(me_response(&user.uid, None, false, params.path.as_deref(), &state)));
        }
    };

    let onboarding_required = profile.is_none();
    Ok(Json(me_response(
        &user.uid,
        profile,
        onboarding_required,
        params.path.as_deref(),
        &state,
    )))
}

fn me_response(
    uid: &str,
    profile: Option<UserProfile>,
    onboarding_required: bool,
    path: Option<&str>,
    state: &AppState,
) -> MeResponse {
    let role = profile
        .as_ref()
        .map(UserProfile::resolved_role)
        .unwrap_or(Role::Student);

    let redirect_to = path
        .and_then(|p| gate::route_guard(p, role))
        .unwrap_or_else(|| gate::route_target(role))
        .to_string();

    let now = chrono::Utc::now();
    MeResponse {
        uid: uid.to_string(),
        role,
        profile: profile.map(|p| ProfileResponse {
            class_level: p
                .cohort_year
                .map(|y| classof::cohort_to_class(y, now, state.config.rollover_month)),
            name: p.name,
            email: p.email,
            cohort_year: p.cohort_year,
        }),
        onboarding_required,
        redirect_to,
    }
}

// ─── Onboarding ──────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct OnboardingRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(range(min = 2000, max = 2100, message = "Implausible cohort year"))]
    pub cohort_year: i32,
    #[validate(email)]
    pub email: Option<String>,
}

/// Create the caller's profile document.
///
/// Role is always created as student; only an admin can change it
/// afterwards.
async fn post_onboarding(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<OnboardingRequest>,
) -> Result<Json<MeResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }

    if state.db.get_profile(&user.uid).await?.is_some() {
        return Err(AppError::BadRequest(
            "Profile already exists for this user".to_string(),
        ));
    }

    let profile = UserProfile {
        uid: user.uid.clone(),
        name: name.to_string(),
        email: payload.email,
        role: Some(Role::Student.as_str().to_string()),
        deleted: None,
        cohort_year: Some(payload.cohort_year),
        created_at: now_iso(),
    };

    state.db.upsert_profile(&profile).await?;

    tracing::info!(uid = %user.uid, cohort_year = payload.cohort_year, "Onboarding complete");

    Ok(Json(me_response(
        &user.uid,
        Some(profile),
        false,
        None,
        &state,
    )))
}

// ─── Sessions ────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    pub id: String,
    pub title: String,
    pub date: String,
    /// Geofence center with the campus default applied
    pub location: GeoPoint,
    /// Geofence radius with the default applied
    pub radius_meters: f64,
    pub note: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionResponse>,
    /// The session the student should be checking into, if any
    pub active_session_id: Option<String>,
}

pub(crate) fn session_response(session: &Session, state: &AppState) -> SessionResponse {
    SessionResponse {
        id: session.id.clone(),
        title: session.title.clone(),
        date: session.date.clone(),
        location: session.location.unwrap_or(state.config.campus_location),
        radius_meters: session
            .radius_meters
            .unwrap_or(state.config.default_radius_meters),
        note: session.note.clone(),
    }
}

/// List recent sessions and pick the active one.
async fn get_sessions(State(state): State<Arc<AppState>>) -> Result<Json<SessionsResponse>> {
    let sessions = state.db.list_sessions(STUDENT_SESSION_LIMIT).await?;
    let active_session_id =
        choose_active_session(&sessions, chrono::Utc::now()).map(|s| s.id.clone());

    Ok(Json(SessionsResponse {
        sessions: sessions
            .iter()
            .map(|s| session_response(s, &state))
            .collect(),
        active_session_id,
    }))
}

// ─── Attendance ──────────────────────────────────────────────

#[derive(Deserialize)]
struct AttendanceQuery {
    session_id: String,
}

/// The caller's attendance record for a session, if any.
async fn get_my_attendance(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<AttendanceQuery>,
) -> Result<Json<Option<AttendanceRecord>>> {
    if params.session_id.trim().is_empty() {
        return Err(AppError::BadRequest("session_id is required".to_string()));
    }
    let record = state.db.get_attendance(&params.session_id, &user.uid).await?;
    Ok(Json(record))
}

#[derive(Deserialize, Validate)]
pub struct PresentRequest {
    #[validate(length(min = 1, message = "session_id is required"))]
    pub session_id: String,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude out of range"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude out of range"))]
    pub lng: f64,
    pub accuracy: Option<f64>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MarkResponse {
    pub record: AttendanceRecord,
    pub decision: Option<geofence::GeofenceDecision>,
}

/// Mark the caller present, gated by the session geofence.
///
/// The write happens only after the distance check admits the reading;
/// a rejected or unreadable location leaves the store untouched.
async fn mark_present(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<PresentRequest>,
) -> Result<Json<MarkResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    if !payload.lat.is_finite() || !payload.lng.is_finite() {
        return Err(AppError::BadRequest(
            "Location reading must be finite".to_string(),
        ));
    }

    let session = state
        .db
        .get_session(&payload.session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", payload.session_id)))?;

    let profile = state
        .db
        .get_profile(&user.uid)
        .await?
        .ok_or_else(|| AppError::BadRequest("Profile name not found".to_string()))?;

    let device = GeoPoint {
        lat: payload.lat,
        lng: payload.lng,
    };
    let center = session.location.unwrap_or(state.config.campus_location);
    let radius = session
        .radius_meters
        .unwrap_or(state.config.default_radius_meters);

    let decision = geofence::evaluate(device, center, radius);
    if !decision.admitted {
        tracing::info!(
            uid = %user.uid,
            session_id = %session.id,
            distance_m = decision.distance_meters,
            radius_m = decision.radius_meters,
            "Present mark rejected by geofence"
        );
        return Err(AppError::OutsideGeofence {
            distance_meters: decision.distance_meters,
            radius_meters: decision.radius_meters,
        });
    }

    let record = AttendanceRecord {
        id: attendance_doc_id(&session.id, &user.uid),
        session_id: session.id.clone(),
        uid: user.uid.clone(),
        name: profile.name,
        status: AttendanceStatus::Present,
        reason: None,
        geo: Some(GeoReading {
            lat: device.lat,
            lng: device.lng,
            accuracy: payload.accuracy,
            distance_meters: Some(decision.distance_meters),
        }),
        created_at: Some(now_iso()),
    };

    state.db.upsert_attendance(&record).await?;

    tracing::info!(
        uid = %user.uid,
        session_id = %session.id,
        distance_m = decision.distance_meters,
        "Present mark admitted"
    );

    Ok(Json(MarkResponse {
        record,
        decision: Some(decision),
    }))
}

#[derive(Deserialize, Validate)]
pub struct ExcusedRequest {
    #[validate(length(min = 1, message = "session_id is required"))]
    pub session_id: String,
    pub reason: String,
}

/// Mark the caller excused with a written reason.
async fn mark_excused(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ExcusedRequest>,
) -> Result<Json<MarkResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let reason = payload.reason.trim();
    if reason.len() < 3 {
        return Err(AppError::BadRequest(
            "Excuse reason must be at least 3 characters".to_string(),
        ));
    }

    let session = state
        .db
        .get_session(&payload.session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", payload.session_id)))?;

    let profile = state
        .db
        .get_profile(&user.uid)
        .await?
        .ok_or_else(|| AppError::BadRequest("Profile name not found".to_string()))?;

    let record = AttendanceRecord {
        id: attendance_doc_id(&session.id, &user.uid),
        session_id: session.id.clone(),
        uid: user.uid.clone(),
        name: profile.name,
        status: AttendanceStatus::Excused,
        reason: Some(reason.to_string()),
        geo: None,
        created_at: Some(now_iso()),
    };

    state.db.upsert_attendance(&record).await?;

    tracing::info!(uid = %user.uid, session_id = %session.id, "Excused mark saved");

    Ok(Json(MarkResponse {
        record,
        decision: None,
    }))
}

/// The caller's last few attendance records across sessions.
async fn get_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<AttendanceRecord>>> {
    let history = state
        .db
        .list_recent_attendance(&user.uid, HISTORY_LIMIT)
        .await?;
    Ok(Json(history))
}
