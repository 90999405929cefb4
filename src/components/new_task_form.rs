//! New Task Form Component
//!
//! Bottom-of-lane input that creates an issue in that column.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::use_board_context;

#[component]
pub fn NewTaskForm(column_id: String) -> impl IntoView {
    let ctx = use_board_context();
    let (new_title, set_new_title) = signal(String::new());

    let create_task = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let title = new_title.get();
        if title.trim().is_empty() { return; }

        let reconciler = ctx.reconciler.clone();
        let column_id = column_id.clone();
        spawn_local(async move {
            if reconciler.create_task(&column_id, &title).await.is_ok() {
                set_new_title.set(String::new());
            }
        });
    };

    view! {
        <form class="new-task-form" on:submit=create_task>
            <input
                type="text"
                placeholder="Add task..."
                prop:value=move || new_title.get()
                on:input=move |ev| set_new_title.set(event_target_value(&ev))
            />
        </form>
    }
}
