//! Database layer (Firestore).

pub mod firestore;
pub mod watch;

pub use firestore::FirestoreDb;
pub use watch::{SessionSnapshot, SessionWatch, Subscription};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const SESSIONS: &str = "sessions";
    pub const ATTENDANCE: &str = "attendance";
}
