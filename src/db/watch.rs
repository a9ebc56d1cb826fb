// SPDX-License-Identifier: MIT

//! Poll-based document subscriptions.
//!
//! The managed store's push channel is reproduced here as owned
//! subscriptions: a background task polls a query on an interval and
//! publishes snapshots through a `tokio::sync::watch` channel. The
//! [`Subscription`] guard owns the task and aborts it on drop, so every
//! subscriber releases its own listener when it goes away. There is no
//! shared global handle.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::db::FirestoreDb;
use crate::models::{AttendanceRecord, UserProfile};

/// Owned handle for a polling subscription; dropping it stops the poll
/// task.
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// One observed state of a session: its attendance records and the
/// current student roster.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub attendance: Vec<AttendanceRecord>,
    pub roster: Vec<UserProfile>,
}

/// Live view of a session's attendance, fed by a polling task.
pub struct SessionWatch {
    pub rx: watch::Receiver<SessionSnapshot>,
    _sub: Subscription,
}

impl SessionWatch {
    /// Wait for the next published snapshot.
    ///
    /// Returns `None` once the publishing task is gone.
    pub async fn next(&mut self) -> Option<SessionSnapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

impl FirestoreDb {
    /// Subscribe to a session's attendance and the student roster.
    ///
    /// A snapshot is published whenever the polled state differs from
    /// the last published one. Poll errors are logged and the previous
    /// snapshot is kept, so a transient read failure degrades to stale
    /// data instead of tearing the stream down.
    pub fn watch_session(&self, session_id: &str, poll_interval: Duration) -> SessionWatch {
        let (tx, rx) = watch::channel(SessionSnapshot::default());
        let db = self.clone();
        let session_id = session_id.to_string();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            let mut last: Option<SessionSnapshot> = None;

            loop {
                ticker.tick().await;

                let attendance = match db.list_attendance_for_session(&session_id).await {
                    Ok(records) => records,
                    Err(e) => {
                        tracing::warn!(session_id = %session_id, error = %e, "Attendance poll failed");
                        continue;
                    }
                };
                let roster = match db.list_students().await {
                    Ok(profiles) => profiles,
                    Err(e) => {
                        tracing::warn!(session_id = %session_id, error = %e, "Roster poll failed");
                        continue;
                    }
                };

                let snapshot = SessionSnapshot { attendance, roster };
                if last.as_ref() != Some(&snapshot) {
                    last = Some(snapshot.clone());
                    if tx.send(snapshot).is_err() {
                        // All receivers dropped
                        break;
                    }
                }
            }
        });

        SessionWatch {
            rx,
            _sub: Subscription { handle },
        }
    }
}
