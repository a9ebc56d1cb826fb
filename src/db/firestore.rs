// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage, roster listing, role changes)
//! - Sessions (admin-created practice sessions)
//! - Attendance (composite-key merge upserts and recap queries)

use std::time::Duration;

use rand::Rng;

use crate::db::collections;
use crate::error::AppError;
use crate::models::{AttendanceRecord, Session, UserProfile};

/// Bound on the profile read used for auth gating; expiry falls back to
/// a one-shot read.
const PROFILE_READ_TIMEOUT: Duration = Duration::from_millis(1500);

/// Alphabet Firestore uses for generated document IDs.
const AUTO_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const AUTO_ID_LENGTH: usize = 20;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// Set FIRESTORE_EMULATOR_HOST to target a local emulator instead
    /// of real credentials.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Emulator connection with a dummy token, so no local credentials
    /// are read or sent.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore emulator");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Mock client for offline tests; every operation errors.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Generate a Firestore-style random document ID.
    fn generate_doc_id() -> String {
        let mut rng = rand::thread_rng();
        (0..AUTO_ID_LENGTH)
            .map(|_| AUTO_ID_ALPHABET[rng.gen_range(0..AUTO_ID_ALPHABET.len())] as char)
            .collect()
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user profile by uid.
    pub async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Profile read for auth gating, bounded by [`PROFILE_READ_TIMEOUT`].
    ///
    /// When the bounded read expires, a one-shot read is attempted
    /// before giving up. Callers resolve a failed read to the student
    /// role rather than failing the request.
    pub async fn get_profile_bounded(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        match tokio::time::timeout(PROFILE_READ_TIMEOUT, self.get_profile(uid)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(uid, "Profile read timed out, falling back to one-shot read");
                self.get_profile(uid).await
            }
        }
    }

    /// Create or update a user profile (merge upsert keyed by uid).
    pub async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&profile.uid)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Flip a user's role, preserving all other profile fields.
    ///
    /// Fetch-modify-write; returns the updated profile.
    pub async fn set_role(&self, uid: &str, role: &str) -> Result<UserProfile, AppError> {
        let mut profile = self
            .get_profile(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", uid)))?;

        profile.role = Some(role.to_string());
        self.upsert_profile(&profile).await?;
        Ok(profile)
    }

    /// List the student roster: non-deleted profiles that do not resolve
    /// to the admin role.
    ///
    /// The soft-delete and role filters run client-side; the `deleted`
    /// field is absent on most documents, which Firestore inequality
    /// filters cannot match.
    pub async fn list_students(&self) -> Result<Vec<UserProfile>, AppError> {
        let profiles: Vec<UserProfile> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(profiles
            .into_iter()
            .filter(|p| !p.is_deleted() && p.resolved_role() == crate::models::Role::Student)
            .collect())
    }

    // ─── Session Operations ──────────────────────────────────────

    /// Store a new session under a generated ID and return it with the
    /// ID filled in.
    pub async fn create_session(&self, mut session: Session) -> Result<Session, AppError> {
        session.id = Self::generate_doc_id();

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SESSIONS)
            .document_id(&session.id)
            .object(&session)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(session)
    }

    /// Get a session by ID.
    pub async fn get_session(&self, session_id: &str) -> Result<Option<Session>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SESSIONS)
            .obj()
            .one(session_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List the most recent sessions, newest first.
    pub async fn list_sessions(&self, limit: u32) -> Result<Vec<Session>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SESSIONS)
            .order_by([("date", firestore::FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Attendance Operations ───────────────────────────────────

    /// Merge-upsert an attendance record at its composite document ID.
    ///
    /// The write key is `{session_id}_{uid}`, so a later mark for the
    /// same (session, user) overwrites the earlier one.
    pub async fn upsert_attendance(&self, record: &AttendanceRecord) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ATTENDANCE)
            .document_id(&record.id)
            .object(record)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get one user's attendance record for a session, if any.
    pub async fn get_attendance(
        &self,
        session_id: &str,
        uid: &str,
    ) -> Result<Option<AttendanceRecord>, AppError> {
        let doc_id = crate::models::attendance_doc_id(session_id, uid);
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ATTENDANCE)
            .obj()
            .one(&doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All attendance records for a session (admin recap/export).
    pub async fn list_attendance_for_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let session_id = session_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ATTENDANCE)
            .filter(move |q| q.for_all([q.field("sessionId").eq(session_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A user's most recent attendance records across sessions.
    pub async fn list_recent_attendance(
        &self,
        uid: &str,
        limit: u32,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let uid = uid.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ATTENDANCE)
            .filter(move |q| q.for_all([q.field("uid").eq(uid.clone())]))
            .order_by([("createdAt", firestore::FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
