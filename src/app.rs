//! Root application component with routing and context providers.

use std::sync::Arc;

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::config::ClientConfig;
use crate::net::api::ApiClient;
use crate::net::auth_api::HttpAuthBackend;
use crate::net::transport::{FetchTransport, Transport};
use crate::pages::{
    admin::AdminPage, forbidden::ForbiddenPage, home::LandingPage, jira::JiraSearchPage, login::AuthPage,
    not_found::NotFoundPage,
};
use crate::router::guard::NavigationGuard;
use crate::state::credential::{BrowserCredentialStore, CredentialStore};
use crate::state::session::Session;
use crate::util::auth::{RouteGate, mirror_session};

/// HTML shell rendered on the server for SSR + hydration.
#[cfg(feature = "ssr")]
pub fn shell(options: LeptosOptions) -> impl IntoView {
    use leptos_meta::MetaTags;

    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Wires the session, guard and API client once and provides them to every
/// page through context.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let config = ClientConfig::from_build_env().unwrap_or_else(|e| {
        leptos::logging::warn!("ignoring build configuration: {e}");
        ClientConfig::default()
    });

    let transport: Arc<dyn Transport> = Arc::new(FetchTransport::new(config.request_timeout));
    let store: Arc<dyn CredentialStore> = Arc::new(BrowserCredentialStore::new(config.storage_key.clone()));
    let backend = Arc::new(HttpAuthBackend::new(Arc::clone(&transport), config.clone()));
    let session = Session::new(store, backend);
    let guard = NavigationGuard::new(session.clone(), &config);
    let api = ApiClient::new(transport, session.clone(), config.clone());
    let auth = mirror_session(&session);

    provide_context(config);
    provide_context(session);
    provide_context(guard);
    provide_context(api);
    provide_context(auth);

    view! {
        <Title text="optool"/>

        <Router>
            <RouteGate>
                <Routes fallback=|| view! { <NotFoundPage/> }>
                    <Route path=StaticSegment("") view=AuthPage/>
                    <Route path=StaticSegment("app") view=LandingPage/>
                    <Route path=(StaticSegment("jira"), StaticSegment("search")) view=JiraSearchPage/>
                    <Route path=StaticSegment("admin") view=AdminPage/>
                    <Route path=StaticSegment("forbidden") view=ForbiddenPage/>
                </Routes>
            </RouteGate>
        </Router>
    }
}
