//! Auth page: sign in with email and password, or request an account.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_location, use_navigate};

use crate::router::guard::NavigationGuard;
use crate::state::auth::AuthState;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    SignIn,
    Register,
}

#[component]
pub fn AuthPage() -> impl IntoView {
    let guard = expect_context::<NavigationGuard>();
    let auth = expect_context::<RwSignal<AuthState>>();
    let navigate = use_navigate();
    let location = use_location();

    let mode = RwSignal::new(Mode::SignIn);
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let full_name = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());

    let busy = move || auth.get().loading;

    let on_sign_in = {
        let guard = guard.clone();
        move |ev: leptos::ev::SubmitEvent| {
            ev.prevent_default();
            let email_value = email.get().trim().to_owned();
            let password_value = password.get();
            if email_value.is_empty() || password_value.is_empty() {
                info.set("Enter your email and password.".to_owned());
                return;
            }
            info.set(String::new());

            let guard = guard.clone();
            let navigate = navigate.clone();
            let search = location.search.get_untracked();
            leptos::task::spawn_local(async move {
                if guard.session().login(&email_value, &password_value).await {
                    password.set(String::new());
                    navigate(&guard.redirect_target(&search), NavigateOptions::default());
                }
            });
        }
    };

    let on_register = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let email_value = email.get().trim().to_owned();
        let password_value = password.get();
        let name_value = full_name.get();
        if email_value.is_empty() || password_value.is_empty() {
            info.set("Enter an email and password.".to_owned());
            return;
        }
        info.set(String::new());

        let session = guard.session().clone();
        leptos::task::spawn_local(async move {
            if session.register(&email_value, &password_value, Some(&name_value)).await {
                password.set(String::new());
                mode.set(Mode::SignIn);
                info.set("Request submitted. An administrator must approve it before you can sign in.".to_owned());
            }
        });
    };

    let error = move || auth.get().last_error.unwrap_or_default();

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"optool"</h1>
                <form class="login-form" class:hidden=move || mode.get() != Mode::SignIn on:submit=on_sign_in>
                    <input
                        class="login-input"
                        type="email"
                        placeholder="you@example.com"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=busy>
                        "Sign In"
                    </button>
                </form>
                <form class="login-form" class:hidden=move || mode.get() != Mode::Register on:submit=on_register>
                    <input
                        class="login-input"
                        type="email"
                        placeholder="you@example.com"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="text"
                        placeholder="Full name (optional)"
                        prop:value=move || full_name.get()
                        on:input=move |ev| full_name.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=busy>
                        "Request Account"
                    </button>
                </form>
                <Show when=move || !error().is_empty()>
                    <p class="login-message login-message--error">{error}</p>
                </Show>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <div class="login-divider"></div>
                <button
                    class="login-link"
                    type="button"
                    on:click=move |_| {
                        info.set(String::new());
                        mode.update(|m| *m = if *m == Mode::SignIn { Mode::Register } else { Mode::SignIn });
                    }
                >
                    {move || if mode.get() == Mode::SignIn { "Request an account" } else { "Back to sign in" }}
                </button>
            </div>
        </div>
    }
}
