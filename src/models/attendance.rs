// SPDX-License-Identifier: MIT

//! Attendance record model.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Attendance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum AttendanceStatus {
    Present,
    Excused,
}

/// Device geolocation reading captured with a present mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GeoReading {
    pub lat: f64,
    pub lng: f64,
    /// Device-reported accuracy in meters (recorded, never used to
    /// adjust the admission decision)
    #[serde(default)]
    pub accuracy: Option<f64>,
    /// Rounded haversine distance to the session center
    #[serde(default)]
    pub distance_meters: Option<f64>,
}

/// Attendance record stored in Firestore (`attendance/{session_id}_{uid}`).
///
/// The composite document ID makes every write an upsert: at most one
/// record per (session, user), later marks overwrite earlier ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[serde(alias = "_firestore_id", default)]
    pub id: String,
    pub session_id: String,
    pub uid: String,
    /// Student display name at time of marking
    pub name: String,
    pub status: AttendanceStatus,
    /// Excuse text; required (trimmed, >= 3 chars) for excused marks
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub geo: Option<GeoReading>,
    /// When the mark was written (ISO 8601)
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Deterministic composite document ID for an attendance record.
pub fn attendance_doc_id(session_id: &str, uid: &str) -> String {
    format!("{}_{}", session_id, uid)
}
