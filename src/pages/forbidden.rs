//! Shown when a signed-in user lacks access to the requested route.

use leptos::prelude::*;

#[component]
pub fn ForbiddenPage() -> impl IntoView {
    view! {
        <div class="status-page">
            <h2>"Access denied"</h2>
            <p>"Your account does not have permission to view this page."</p>
            <a href="/app">"Back to home"</a>
        </div>
    }
}
