//! Auth-session snapshot for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! `Session` owns the authoritative state; this is the read-only copy pushed
//! into a reactive signal so route guards and user-aware components can
//! render from it.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::net::types::UserProfile;

/// Point-in-time copy of the session fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    /// A bearer credential is held.
    pub authenticated: bool,
    pub user: Option<UserProfile>,
    /// A login or registration request is in flight.
    pub loading: bool,
    /// The one-time restore has completed.
    pub bootstrapped: bool,
    pub last_error: Option<String>,
}

impl AuthState {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.authenticated && self.user.as_ref().is_some_and(|u| u.is_admin)
    }

    /// Display name of the signed-in user, if the profile is known.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.user.as_ref().map(UserProfile::display_name)
    }
}
