//! Route table and per-route access flags.
//!
//! DESIGN
//! ======
//! Flags are declared on route records and merged parent -> child at match
//! time, so a section marked `requires_auth` protects every page under it.
//! The table is a `const`; nothing mutates it at runtime.

#[cfg(test)]
#[path = "policy_test.rs"]
mod policy_test;

/// Access requirements for a route. All-false means public.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    pub requires_auth: bool,
    pub guest_only: bool,
    pub requires_admin: bool,
}

impl AccessPolicy {
    pub const PUBLIC: Self = Self { requires_auth: false, guest_only: false, requires_admin: false };
    pub const GUEST_ONLY: Self = Self { requires_auth: false, guest_only: true, requires_admin: false };
    pub const AUTHENTICATED: Self = Self { requires_auth: true, guest_only: false, requires_admin: false };
    pub const ADMIN: Self = Self { requires_auth: true, guest_only: false, requires_admin: true };

    /// Combine with a child record's flags; any flag set on either side holds.
    #[must_use]
    pub const fn merge(self, child: Self) -> Self {
        Self {
            requires_auth: self.requires_auth || child.requires_auth,
            guest_only: self.guest_only || child.guest_only,
            requires_admin: self.requires_admin || child.requires_admin,
        }
    }

    /// `requires_auth` and `guest_only` are mutually exclusive.
    #[must_use]
    pub const fn is_consistent(self) -> bool {
        !(self.requires_auth && self.guest_only)
    }
}

/// A route record. Paths are relative to the parent; `name` is `None` for
/// sections that only group children.
#[derive(Debug)]
pub struct RouteDef {
    pub name: Option<&'static str>,
    pub path: &'static str,
    pub policy: AccessPolicy,
    pub children: &'static [RouteDef],
}

pub const AUTH: &str = "auth";
pub const APP_HOME: &str = "app-home";
pub const JIRA_SEARCH: &str = "jira-search";
pub const ADMIN: &str = "admin";
pub const FORBIDDEN: &str = "forbidden";
pub const NOT_FOUND: &str = "not-found";

pub const ROUTES: &[RouteDef] = &[
    RouteDef { name: Some(AUTH), path: "", policy: AccessPolicy::GUEST_ONLY, children: &[] },
    RouteDef { name: Some(APP_HOME), path: "app", policy: AccessPolicy::AUTHENTICATED, children: &[] },
    RouteDef {
        name: None,
        path: "jira",
        policy: AccessPolicy::AUTHENTICATED,
        children: &[RouteDef { name: Some(JIRA_SEARCH), path: "search", policy: AccessPolicy::PUBLIC, children: &[] }],
    },
    RouteDef { name: Some(ADMIN), path: "admin", policy: AccessPolicy::ADMIN, children: &[] },
    RouteDef { name: Some(FORBIDDEN), path: "forbidden", policy: AccessPolicy::PUBLIC, children: &[] },
];

/// Result of matching a path against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMatch {
    pub name: &'static str,
    pub policy: AccessPolicy,
}

/// Resolve a path (without query) to its route and merged policy.
///
/// Unknown paths resolve to the public not-found route; a bare section path
/// resolves to not-found under the section's policy.
#[must_use]
pub fn resolve(path: &str) -> RouteMatch {
    resolve_in(ROUTES, path)
}

pub(crate) fn resolve_in(routes: &'static [RouteDef], path: &str) -> RouteMatch {
    let segments: Vec<&str> = split(path);
    walk(routes, &segments, AccessPolicy::PUBLIC).unwrap_or(RouteMatch { name: NOT_FOUND, policy: AccessPolicy::PUBLIC })
}

fn walk(routes: &'static [RouteDef], segments: &[&str], inherited: AccessPolicy) -> Option<RouteMatch> {
    for route in routes {
        let own = split(route.path);
        if !segments.starts_with(&own) {
            continue;
        }
        let rest = &segments[own.len()..];
        let policy = inherited.merge(route.policy);
        if rest.is_empty() {
            if let Some(name) = route.name {
                return Some(RouteMatch { name, policy });
            }
        }
        if let Some(found) = walk(route.children, rest, policy) {
            return Some(found);
        }
        if rest.is_empty() {
            // Section with no page of its own: not found, but still guarded.
            return Some(RouteMatch { name: NOT_FOUND, policy });
        }
    }
    None
}

fn split(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Every routable record with its merged policy, in declaration order.
#[cfg(test)]
pub(crate) fn flatten(routes: &'static [RouteDef]) -> Vec<(String, RouteMatch)> {
    fn visit(routes: &'static [RouteDef], prefix: &str, inherited: AccessPolicy, out: &mut Vec<(String, RouteMatch)>) {
        for route in routes {
            let path = if route.path.is_empty() { prefix.to_owned() } else { format!("{prefix}/{}", route.path) };
            let policy = inherited.merge(route.policy);
            if let Some(name) = route.name {
                let shown = if path.is_empty() { "/".to_owned() } else { path.clone() };
                out.push((shown, RouteMatch { name, policy }));
            }
            visit(route.children, &path, policy, out);
        }
    }
    let mut out = Vec::new();
    visit(routes, "", AccessPolicy::PUBLIC, &mut out);
    out
}
