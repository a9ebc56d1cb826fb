// SPDX-License-Identifier: MIT

//! Practice session model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Scheduled practice session stored in Firestore (`sessions/{id}`).
///
/// Immutable after creation; there is deliberately no update or delete
/// operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Generated document ID
    #[serde(alias = "_firestore_id", default)]
    pub id: String,
    /// Session title
    pub title: String,
    /// Scheduled date/time (ISO 8601)
    pub date: String,
    /// Geofence center; campus default applied at creation
    #[serde(default)]
    pub location: Option<GeoPoint>,
    /// Geofence radius in meters; default applied at creation
    #[serde(default)]
    pub radius_meters: Option<f64>,
    /// Optional free-form note
    #[serde(default)]
    pub note: Option<String>,
    /// When the session was created (ISO 8601)
    pub created_at: String,
}

impl Session {
    /// Parsed session date, if the stored string is valid RFC 3339.
    pub fn date_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.date)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Pick the session a student should be checking into.
///
/// Prefers the earliest session dated no more than 24 hours in the
/// past; falls back to the most recent session overall. `sessions` is
/// expected newest-first as returned by the session listing query.
pub fn choose_active_session<'a>(
    sessions: &'a [Session],
    now: DateTime<Utc>,
) -> Option<&'a Session> {
    let cutoff = now - chrono::Duration::hours(24);

    sessions
        .iter()
        .filter(|s| s.date_utc().is_some_and(|d| d >= cutoff))
        .min_by_key(|s| s.date_utc())
        .or_else(|| sessions.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session(id: &str, date: &str) -> Session {
        Session {
            id: id.to_string(),
            title: format!("Latihan {}", id),
            date: date.to_string(),
            location: None,
            radius_meters: None,
            note: None,
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_prefers_earliest_upcoming_session() {
        // Newest-first, as the query returns them
        let sessions = vec![
            session("far", "2026-03-20T09:00:00Z"),
            session("near", "2026-03-11T09:00:00Z"),
            session("old", "2026-02-01T09:00:00Z"),
        ];

        let chosen = choose_active_session(&sessions, now()).unwrap();
        assert_eq!(chosen.id, "near");
    }

    #[test]
    fn test_session_within_last_24h_still_active() {
        let sessions = vec![
            session("future", "2026-03-20T09:00:00Z"),
            session("this-morning", "2026-03-10T06:00:00Z"),
        ];

        let chosen = choose_active_session(&sessions, now()).unwrap();
        assert_eq!(chosen.id, "this-morning");
    }

    #[test]
    fn test_falls_back_to_most_recent_when_all_past() {
        let sessions = vec![
            session("last-week", "2026-03-03T09:00:00Z"),
            session("last-month", "2026-02-03T09:00:00Z"),
        ];

        let chosen = choose_active_session(&sessions, now()).unwrap();
        assert_eq!(chosen.id, "last-week");
    }

    #[test]
    fn test_empty_list_yields_none() {
        assert!(choose_active_session(&[], now()).is_none());
    }
}
