// SPDX-License-Identifier: MIT

//! Academic-year and class-level calculation.
//!
//! The academic year starts in a configurable rollover month (July by
//! default); a student's current grade is derived from how many
//! academic years have passed since their cohort enrolled.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Current class level derived from a cohort year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ClassLevel {
    #[serde(rename = "10")]
    Grade10,
    #[serde(rename = "11")]
    Grade11,
    #[serde(rename = "12")]
    Grade12,
    #[serde(rename = "alumni")]
    Alumni,
}

/// Year component of the academic year containing `date`.
///
/// The academic year starting in `rollover_month` of year Y runs until
/// the month before `rollover_month` of year Y+1 and is labeled Y.
pub fn current_academic_year_start(date: DateTime<Utc>, rollover_month: u32) -> i32 {
    if date.month() >= rollover_month {
        date.year()
    } else {
        date.year() - 1
    }
}

/// Map a cohort enrollment year to the current class level.
///
/// Offset 0 is grade 10, 1 is grade 11, 2 is grade 12, three or more
/// is alumni. Future cohort years clamp to grade 10.
pub fn cohort_to_class(cohort_year: i32, date: DateTime<Utc>, rollover_month: u32) -> ClassLevel {
    let ay_start = current_academic_year_start(date, rollover_month);
    match ay_start - cohort_year {
        i32::MIN..=0 => ClassLevel::Grade10,
        1 => ClassLevel::Grade11,
        2 => ClassLevel::Grade12,
        _ => ClassLevel::Alumni,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, 15, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_academic_year_rolls_over_in_july() {
        assert_eq!(current_academic_year_start(at(2026, 7), 7), 2026);
        assert_eq!(current_academic_year_start(at(2026, 6), 7), 2025);
        assert_eq!(current_academic_year_start(at(2026, 12), 7), 2026);
        assert_eq!(current_academic_year_start(at(2026, 1), 7), 2025);
    }

    #[test]
    fn test_cohort_offsets_map_to_grades() {
        let now = at(2026, 9); // academic year 2026
        assert_eq!(cohort_to_class(2026, now, 7), ClassLevel::Grade10);
        assert_eq!(cohort_to_class(2025, now, 7), ClassLevel::Grade11);
        assert_eq!(cohort_to_class(2024, now, 7), ClassLevel::Grade12);
        assert_eq!(cohort_to_class(2023, now, 7), ClassLevel::Alumni);
        assert_eq!(cohort_to_class(2020, now, 7), ClassLevel::Alumni);
    }

    #[test]
    fn test_future_cohort_clamps_to_grade_10() {
        let now = at(2026, 9);
        assert_eq!(cohort_to_class(2027, now, 7), ClassLevel::Grade10);
        assert_eq!(cohort_to_class(2030, now, 7), ClassLevel::Grade10);
    }

    #[test]
    fn test_class_level_serialization() {
        assert_eq!(serde_json::to_string(&ClassLevel::Grade10).unwrap(), "\"10\"");
        assert_eq!(
            serde_json::to_string(&ClassLevel::Alumni).unwrap(),
            "\"alumni\""
        );
    }
}
