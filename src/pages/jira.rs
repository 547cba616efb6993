//! Jira task search.

use leptos::prelude::*;

use crate::net::api::ApiClient;

#[component]
pub fn JiraSearchPage() -> impl IntoView {
    let api = expect_context::<ApiClient>();
    let start = RwSignal::new(String::new());
    let end = RwSignal::new(String::new());
    let jql = RwSignal::new(None::<String>);
    let info = RwSignal::new(String::new());

    let on_preview = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let start_value = start.get().trim().to_owned();
        let end_value = end.get().trim().to_owned();
        if start_value.is_empty() || end_value.is_empty() {
            info.set("Enter a start and end date.".to_owned());
            return;
        }
        info.set(String::new());

        let api = api.clone();
        leptos::task::spawn_local(async move {
            let query = [("start", start_value.as_str()), ("end", end_value.as_str())];
            match api.get_with_query::<_, serde_json::Value>("/jira/example-jql", &query[..]).await {
                Ok(body) => jql.set(body.get("jql").and_then(|v| v.as_str()).map(str::to_owned)),
                Err(e) => info.set(e.user_message("Search failed")),
            }
        });
    };

    view! {
        <div class="jira-page">
            <h2>"Jira tasks"</h2>
            <form class="jira-form" on:submit=on_preview>
                <input
                    type="date"
                    prop:value=move || start.get()
                    on:input=move |ev| start.set(event_target_value(&ev))
                />
                <input
                    type="date"
                    prop:value=move || end.get()
                    on:input=move |ev| end.set(event_target_value(&ev))
                />
                <button class="btn" type="submit">"Preview JQL"</button>
            </form>
            <Show when=move || jql.get().is_some()>
                <pre class="jira-jql">{move || jql.get().unwrap_or_default()}</pre>
            </Show>
            <Show when=move || !info.get().is_empty()>
                <p class="jira-message">{move || info.get()}</p>
            </Show>
        </div>
    }
}
