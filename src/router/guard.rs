//! Navigation guard: restore the session once, then apply route access flags.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every route change goes through `NavigationGuard::evaluate` before the
//! destination renders. The first evaluation awaits the session's one-time
//! restore so access decisions never run on a half-restored session.
//!
//! Per navigation: `Pending -> [Bootstrapping] -> Evaluated -> Allowed | Redirected`.
//! Evaluation always reaches a terminal phase; a failed restore has already
//! logged the session out, so evaluation proceeds on a logged-out state.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use super::policy::{self, AccessPolicy};
use crate::config::ClientConfig;
use crate::state::auth::AuthState;
use crate::state::session::Session;

/// Query parameter carrying the originally requested path to the login page.
pub const REDIRECT_PARAM: &str = "redirect";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardPhase {
    Pending,
    Bootstrapping,
    Evaluated,
    Redirected,
    Allowed,
}

/// Outcome of a guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    /// Replace the navigation with this full path.
    Redirect(String),
}

impl Navigation {
    #[must_use]
    pub fn phase(&self) -> GuardPhase {
        match self {
            Self::Allow => GuardPhase::Allowed,
            Self::Redirect(_) => GuardPhase::Redirected,
        }
    }
}

/// Where redirects send the user.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Targets {
    login: String,
    landing: String,
    access_denied: String,
}

/// Route-change interceptor bound to one session.
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    session: Session,
    targets: Targets,
}

impl NavigationGuard {
    #[must_use]
    pub fn new(session: Session, config: &ClientConfig) -> Self {
        Self {
            session,
            targets: Targets {
                login: config.login_route.clone(),
                landing: config.landing_route.clone(),
                access_denied: config.access_denied_route.clone(),
            },
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Decide whether navigation to `full_path` (path plus optional query)
    /// may proceed.
    pub async fn evaluate(&self, full_path: &str) -> Navigation {
        let mut phase = GuardPhase::Pending;
        if !self.session.is_bootstrapped() {
            phase = transition(full_path, phase, GuardPhase::Bootstrapping);
            self.session.bootstrap().await;
        }
        transition(full_path, phase, GuardPhase::Evaluated);

        let route = policy::resolve(path_of(full_path));
        let outcome = self.decide(route.policy, &self.session.snapshot(), full_path);
        transition(full_path, GuardPhase::Evaluated, outcome.phase());
        outcome
    }

    /// Apply `policy` to `state`. Pure; no bootstrap.
    #[must_use]
    pub fn decide(&self, policy: AccessPolicy, state: &AuthState, full_path: &str) -> Navigation {
        if policy.requires_auth && !state.authenticated {
            return Navigation::Redirect(self.login_redirect(full_path));
        }
        if policy.guest_only && state.authenticated {
            return Navigation::Redirect(self.targets.landing.clone());
        }
        if policy.requires_admin && !state.is_admin() {
            return Navigation::Redirect(self.targets.access_denied.clone());
        }
        Navigation::Allow
    }

    /// Login route carrying `full_path` as the return target.
    #[must_use]
    pub fn login_redirect(&self, full_path: &str) -> String {
        match serde_urlencoded::to_string([(REDIRECT_PARAM, full_path)]) {
            Ok(query) => format!("{}?{query}", self.targets.login),
            Err(_) => self.targets.login.clone(),
        }
    }

    /// Where to go after a successful login, from the login page's query.
    ///
    /// Only same-origin absolute paths are honored; anything else, including
    /// a loop back to a guest-only page, yields the landing route.
    #[must_use]
    pub fn redirect_target(&self, query: &str) -> String {
        query_param(query, REDIRECT_PARAM)
            .filter(|target| is_local_path(target))
            .filter(|target| !policy::resolve(path_of(target)).policy.guest_only)
            .unwrap_or_else(|| self.targets.landing.clone())
    }
}

fn transition(full_path: &str, from: GuardPhase, to: GuardPhase) -> GuardPhase {
    log::debug!("guard {full_path}: {from:?} -> {to:?}");
    to
}

/// Path component of a full path, without query or fragment.
#[must_use]
pub fn path_of(full_path: &str) -> &str {
    let end = full_path.find(['?', '#']).unwrap_or(full_path.len());
    &full_path[..end]
}

/// First value of `name` in a query string (leading `?` optional).
#[must_use]
pub fn query_param(query: &str, name: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    serde_urlencoded::from_str::<Vec<(String, String)>>(query)
        .ok()?
        .into_iter()
        .find_map(|(k, v)| (k == name).then_some(v))
}

fn is_local_path(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.contains('\\')
}
