// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod attendance;
pub mod session;
pub mod user;

pub use attendance::{attendance_doc_id, AttendanceRecord, AttendanceStatus, GeoReading};
pub use session::{choose_active_session, GeoPoint, Session};
pub use user::{Role, UserProfile};
