// SPDX-License-Identifier: MIT

//! Services module - domain logic layer.

pub mod classof;
pub mod gate;
pub mod geofence;
pub mod recap;

pub use classof::{cohort_to_class, current_academic_year_start, ClassLevel};
pub use gate::{route_guard, route_target, GateEvent, GateState};
pub use geofence::{distance_meters, GeofenceDecision};
pub use recap::{build_recap, export_csv, Recap};
