//! Admin review of pending registrations.

use leptos::prelude::*;
use serde::Deserialize;

use crate::net::api::ApiClient;

/// Registration awaiting review, as served on the `/api` channel.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub status: String,
    #[serde(default)]
    pub requested_at: Option<String>,
}

#[component]
pub fn AdminPage() -> impl IntoView {
    let api = expect_context::<ApiClient>();
    let pending = RwSignal::new(Vec::<PendingUser>::new());
    let info = RwSignal::new(String::new());

    Effect::new(move || {
        let api = api.clone();
        leptos::task::spawn_local(async move {
            match api.get::<Vec<PendingUser>>("/admin/users/pending").await {
                Ok(rows) => pending.set(rows),
                Err(e) => info.set(e.user_message("Could not load pending users")),
            }
        });
    });

    view! {
        <div class="admin-page">
            <h2>"Pending registrations"</h2>
            <Show when=move || !info.get().is_empty()>
                <p class="admin-message">{move || info.get()}</p>
            </Show>
            <ul class="admin-list">
                <For
                    each=move || pending.get()
                    key=|user| user.id.clone()
                    children=|user| {
                        let name = user.full_name.clone().unwrap_or_default();
                        view! {
                            <li class="admin-row">
                                <span class="admin-row__email">{user.email}</span>
                                <span class="admin-row__name">{name}</span>
                                <span class="admin-row__status">{user.status}</span>
                            </li>
                        }
                    }
                />
            </ul>
        </div>
    }
}
