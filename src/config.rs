//! Application configuration loaded from environment variables.
//!
//! Everything has a development-friendly default except the JWT signing
//! key, which must always be provided.

use std::env;

use crate::models::GeoPoint;

/// Default geofence center: SMAN 16 Bandung (Mekarsari, Kiaracondong).
pub const DEFAULT_CAMPUS_LOCATION: GeoPoint = GeoPoint {
    lat: -6.9273429,
    lng: 107.6559513,
};

/// Default geofence radius in meters.
pub const DEFAULT_RADIUS_METERS: f64 = 200.0;

/// Academic years start in July.
pub const DEFAULT_ROLLOVER_MONTH: u32 = 7;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed as CORS origin
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Geofence center applied when a session has no location
    pub campus_location: GeoPoint,
    /// Geofence radius applied when a session has no radius
    pub default_radius_meters: f64,
    /// Month (1-12) in which the academic year rolls over
    pub rollover_month: u32,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:4321".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            campus_location: DEFAULT_CAMPUS_LOCATION,
            default_radius_meters: DEFAULT_RADIUS_METERS,
            rollover_month: DEFAULT_ROLLOVER_MONTH,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file first if one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:4321".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            campus_location: GeoPoint {
                lat: parse_env_f64("CAMPUS_LAT", DEFAULT_CAMPUS_LOCATION.lat)?,
                lng: parse_env_f64("CAMPUS_LNG", DEFAULT_CAMPUS_LOCATION.lng)?,
            },
            default_radius_meters: parse_env_f64("DEFAULT_RADIUS_METERS", DEFAULT_RADIUS_METERS)?,
            rollover_month: match env::var("ACADEMIC_ROLLOVER_MONTH") {
                Ok(raw) => match raw.parse::<u32>() {
                    Ok(m) if (1..=12).contains(&m) => m,
                    _ => return Err(ConfigError::Invalid("ACADEMIC_ROLLOVER_MONTH")),
                },
                Err(_) => DEFAULT_ROLLOVER_MONTH,
            },
        })
    }
}

fn parse_env_f64(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
