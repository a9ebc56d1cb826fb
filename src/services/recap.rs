// SPDX-License-Identifier: MIT

//! Attendance recap aggregation and CSV export.

use std::collections::HashSet;

use crate::models::{AttendanceRecord, AttendanceStatus, UserProfile};

/// Per-session recap: who is present, excused, or not yet marked.
#[derive(Debug, Clone, Default)]
pub struct Recap {
    pub present: Vec<AttendanceRecord>,
    pub excused: Vec<AttendanceRecord>,
    pub not_marked: Vec<UserProfile>,
}

/// Partition a session's attendance against the student roster.
///
/// `roster` is expected to already exclude admins and soft-deleted
/// profiles. Students whose uid appears in no attendance record land in
/// `not_marked`.
pub fn build_recap(attendance: &[AttendanceRecord], roster: &[UserProfile]) -> Recap {
    let attended: HashSet<&str> = attendance.iter().map(|a| a.uid.as_str()).collect();

    Recap {
        present: attendance
            .iter()
            .filter(|a| a.status == AttendanceStatus::Present)
            .cloned()
            .collect(),
        excused: attendance
            .iter()
            .filter(|a| a.status == AttendanceStatus::Excused)
            .cloned()
            .collect(),
        not_marked: roster
            .iter()
            .filter(|u| !attended.contains(u.uid.as_str()))
            .cloned()
            .collect(),
    }
}

/// Render attendance records as CSV.
///
/// Byte-compatible with the original exporter: a fixed header row, every
/// field double-quoted with embedded quotes doubled, rows joined by `\n`
/// with no trailing newline.
pub fn export_csv(records: &[AttendanceRecord]) -> String {
    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(csv_row(&[
        "sessionId",
        "uid",
        "name",
        "status",
        "reason",
        "createdAt",
    ]));

    for record in records {
        let status = match record.status {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Excused => "excused",
        };
        rows.push(csv_row(&[
            &record.session_id,
            &record.uid,
            &record.name,
            status,
            record.reason.as_deref().unwrap_or(""),
            record.created_at.as_deref().unwrap_or(""),
        ]));
    }

    rows.join("\n")
}

fn csv_row(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| format!("\"{}\"", f.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",")
}
