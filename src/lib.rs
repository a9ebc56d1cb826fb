// SPDX-License-Identifier: MIT

//! basketsman16: student attendance for SMAN 16 Bandung basketball
//!
//! This crate provides the backend API for scheduled practice sessions,
//! geofenced attendance marking, and admin recaps over Firestore.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
}
