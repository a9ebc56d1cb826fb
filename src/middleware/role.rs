// SPDX-License-Identifier: MIT

//! Admin role gate.

use crate::error::AppError;
use crate::models::Role;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::auth::AuthUser;

/// Middleware that requires the caller's profile to resolve to admin.
///
/// Runs after `require_auth`. A failed or timed-out profile read
/// resolves to the student role, so an unreadable profile never grants
/// admin access.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or(AppError::Unauthorized)?;

    let role = match state.db.get_profile_bounded(&user.uid).await {
        Ok(Some(profile)) => profile.resolved_role(),
        Ok(None) => Role::Student,
        Err(e) => {
            tracing::warn!(uid = %user.uid, error = %e, "Profile read failed, resolving role to student");
            Role::Student
        }
    };

    if role != Role::Admin {
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}
