//! Landing page shown after sign-in.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::config::ClientConfig;
use crate::state::auth::AuthState;
use crate::state::session::Session;

#[component]
pub fn LandingPage() -> impl IntoView {
    let session = expect_context::<Session>();
    let config = expect_context::<ClientConfig>();
    let auth = expect_context::<RwSignal<AuthState>>();
    let navigate = use_navigate();

    let name = move || auth.get().display_name().map(str::to_owned).unwrap_or_default();

    let on_logout = move |_: leptos::ev::MouseEvent| {
        session.logout();
        navigate(&config.login_route, NavigateOptions::default());
    };

    view! {
        <div class="landing-page">
            <header class="landing-header">
                <span class="landing-user">{name}</span>
                <button class="btn" on:click=on_logout>"Sign out"</button>
            </header>
            <nav class="landing-nav">
                <a href="/jira/search">"Jira search"</a>
                <Show when=move || auth.get().is_admin()>
                    <a href="/admin">"Pending registrations"</a>
                </Show>
            </nav>
        </div>
    }
}
