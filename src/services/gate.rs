// SPDX-License-Identifier: MIT

//! Auth-gate state machine and role-based route guard.
//!
//! The gate reacts to two independent feeds: authentication-session
//! changes and profile-document changes for the signed-in user. Profile
//! read failures and timeouts resolve to the student role rather than
//! leaving the user stuck (fail open to least privilege).
//!
//! Routing is a single deterministic evaluation per navigation
//! ([`route_guard`]); there are no retried imperative redirects.

use crate::models::Role;

/// Gate state for a connected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// No authentication session
    Unauthenticated,
    /// Sign-in started, no session yet
    Authenticating,
    /// Session established, profile document not yet resolved
    AwaitingProfile,
    /// Session established but no profile document exists
    Onboarding,
    /// Profile resolved; user belongs on the role's dashboard
    Routed(Role),
}

/// Events driving the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    /// Sign-in flow started
    SignInStarted,
    /// Authentication session established
    SignedIn,
    /// Sign-in flow failed
    SignInFailed,
    /// Authentication session ended
    SignedOut,
    /// Profile document snapshot arrived; `None` means no document
    ProfileSnapshot(Option<Role>),
    /// Profile read failed
    ProfileError,
    /// Profile read exceeded its timeout and the one-shot fallback
    /// also failed to resolve
    ProfileTimeout,
    /// Onboarding form submitted and the profile created
    OnboardingComplete,
}

impl GateState {
    /// Apply an event, returning the next state.
    pub fn apply(self, event: GateEvent) -> GateState {
        use GateEvent::*;
        use GateState::*;

        match (self, event) {
            // Sign-out resets everything, from any state
            (_, SignedOut) => Unauthenticated,

            (Unauthenticated, SignInStarted) => Authenticating,
            (Authenticating, SignInFailed) => Unauthenticated,
            (Unauthenticated | Authenticating, SignedIn) => AwaitingProfile,

            (AwaitingProfile, ProfileSnapshot(Some(role))) => Routed(role),
            (AwaitingProfile, ProfileSnapshot(None)) => Onboarding,
            // Fail open: an unreadable profile gets the least-privileged role
            (AwaitingProfile, ProfileError | ProfileTimeout) => Routed(Role::Student),

            (Onboarding, OnboardingComplete) => Routed(Role::Student),

            // Live role changes while routed (admin flipped the role field)
            (Routed(_), ProfileSnapshot(Some(role))) => Routed(role),
            (Routed(_), ProfileSnapshot(None)) => Onboarding,

            (state, _) => state,
        }
    }
}

/// Dashboard path for a resolved role.
pub fn route_target(role: Role) -> &'static str {
    match role {
        Role::Admin => "/admin",
        Role::Student => "/student",
    }
}

/// Single-evaluation route guard.
///
/// Returns the path the client should be redirected to, or `None` when
/// the current path already matches the resolved role. Evaluated once
/// per navigation.
pub fn route_guard(path: &str, role: Role) -> Option<&'static str> {
    let target = route_target(role);

    if path == "/" {
        return Some(target);
    }
    if path.starts_with("/student") && role == Role::Admin {
        return Some("/admin");
    }
    if path.starts_with("/admin") && role == Role::Student {
        return Some("/student");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_to_routed_admin() {
        let state = GateState::Unauthenticated
            .apply(GateEvent::SignInStarted)
            .apply(GateEvent::SignedIn)
            .apply(GateEvent::ProfileSnapshot(Some(Role::Admin)));
        assert_eq!(state, GateState::Routed(Role::Admin));
    }

    #[test]
    fn test_missing_profile_enters_onboarding() {
        let state = GateState::AwaitingProfile.apply(GateEvent::ProfileSnapshot(None));
        assert_eq!(state, GateState::Onboarding);

        let state = state.apply(GateEvent::OnboardingComplete);
        assert_eq!(state, GateState::Routed(Role::Student));
    }

    #[test]
    fn test_profile_error_fails_open_to_student() {
        assert_eq!(
            GateState::AwaitingProfile.apply(GateEvent::ProfileError),
            GateState::Routed(Role::Student)
        );
        assert_eq!(
            GateState::AwaitingProfile.apply(GateEvent::ProfileTimeout),
            GateState::Routed(Role::Student)
        );
    }

    #[test]
    fn test_sign_out_resets_from_any_state() {
        for state in [
            GateState::Authenticating,
            GateState::AwaitingProfile,
            GateState::Onboarding,
            GateState::Routed(Role::Admin),
        ] {
            assert_eq!(state.apply(GateEvent::SignedOut), GateState::Unauthenticated);
        }
    }

    #[test]
    fn test_live_role_change_reroutes() {
        let state = GateState::Routed(Role::Student)
            .apply(GateEvent::ProfileSnapshot(Some(Role::Admin)));
        assert_eq!(state, GateState::Routed(Role::Admin));
    }

    #[test]
    fn test_irrelevant_events_do_not_move_state() {
        assert_eq!(
            GateState::Unauthenticated.apply(GateEvent::ProfileError),
            GateState::Unauthenticated
        );
        assert_eq!(
            GateState::Routed(Role::Admin).apply(GateEvent::SignedIn),
            GateState::Routed(Role::Admin)
        );
    }

    #[test]
    fn test_route_guard_redirects_home_by_role() {
        assert_eq!(route_guard("/", Role::Admin), Some("/admin"));
        assert_eq!(route_guard("/", Role::Student), Some("/student"));
    }

    #[test]
    fn test_route_guard_forces_role_matched_paths() {
        assert_eq!(route_guard("/student", Role::Admin), Some("/admin"));
        assert_eq!(route_guard("/admin/rekap", Role::Student), Some("/student"));
    }

    #[test]
    fn test_route_guard_is_quiet_on_matching_paths() {
        assert_eq!(route_guard("/admin", Role::Admin), None);
        assert_eq!(route_guard("/student/riwayat", Role::Student), None);
        assert_eq!(route_guard("/about", Role::Student), None);
    }
}
