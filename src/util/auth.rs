//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session lives outside the reactive graph. These helpers mirror it into
//! a signal and run the navigation guard whenever the location changes, so
//! pages only ever render after the guard has allowed them.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_location, use_navigate};

use crate::router::guard::{Navigation, NavigationGuard};
use crate::state::auth::AuthState;
use crate::state::session::Session;

/// Signal that tracks every session change.
pub fn mirror_session(session: &Session) -> RwSignal<AuthState> {
    let auth = RwSignal::new(session.snapshot());
    session.watch(move |state| auth.set(state.clone()));
    auth
}

/// Join a location's pathname and search into the path the guard evaluates.
pub fn full_path(pathname: &str, search: &str) -> String {
    let search = search.strip_prefix('?').unwrap_or(search);
    if search.is_empty() { pathname.to_owned() } else { format!("{pathname}?{search}") }
}

/// Run `guard` on every location change and navigate away on redirects.
///
/// Returns the full path most recently allowed. Navigations are not
/// cancellable, so every evaluation completes; only the newest one is
/// applied.
pub fn install_route_guard<F>(guard: NavigationGuard, navigate: F) -> RwSignal<Option<String>>
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    let location = use_location();
    let allowed = RwSignal::new(None::<String>);
    let latest = Arc::new(AtomicU64::new(0));

    Effect::new(move || {
        let target = full_path(&location.pathname.get(), &location.search.get());
        let seq = latest.fetch_add(1, Ordering::SeqCst) + 1;
        let guard = guard.clone();
        let navigate = navigate.clone();
        let latest = Arc::clone(&latest);

        leptos::task::spawn_local(async move {
            let outcome = guard.evaluate(&target).await;
            if latest.load(Ordering::SeqCst) != seq {
                return;
            }
            match outcome {
                Navigation::Allow => allowed.set(Some(target)),
                Navigation::Redirect(to) => {
                    navigate(&to, NavigateOptions { replace: true, ..NavigateOptions::default() });
                }
            }
        });
    });

    allowed
}

/// Renders its children only once the guard has allowed the current location.
#[component]
pub fn RouteGate(children: ChildrenFn) -> impl IntoView {
    let guard = expect_context::<NavigationGuard>();
    let navigate = use_navigate();
    let location = use_location();
    let allowed = install_route_guard(guard, navigate);

    let ready = move || {
        let current = full_path(&location.pathname.get(), &location.search.get());
        allowed.get().is_some_and(|path| path == current)
    };

    view! {
        <Show when=ready fallback=|| view! { <div class="route-pending"></div> }>
            {children()}
        </Show>
    }
}
