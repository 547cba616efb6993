use leptos::prelude::*;

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <div class="status-page">
            <h2>"Page not found"</h2>
            <a href="/">"Go home"</a>
        </div>
    }
}
