//! Filter Bar Component
//!
//! Parent (epic) filter, add-column input and a manual refresh.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::use_board_context;
use crate::models::{Issue, IssueFilter};
use crate::store::BoardStateStoreFields;

#[component]
pub fn FilterBar() -> impl IntoView {
    let ctx = use_board_context();
    let (epics, set_epics) = signal(Vec::<Issue>::new());
    let (new_column, set_new_column) = signal(String::new());

    // Parent choices follow the board's data
    {
        let ctx = ctx.clone();
        Effect::new(move |_| {
            let _ = ctx.cache.invalidations.get();
            let api = ctx.reconciler.api().clone();
            let project_id = ctx.store.project_id().get_untracked();
            spawn_local(async move {
                match api.list_issues(&project_id, &IssueFilter::default()).await {
                    Ok(issues) => {
                        set_epics.set(issues.into_iter().filter(|i| i.issue_type == "epic").collect())
                    }
                    Err(err) => tracing::warn!(error = %err, "could not load parent issues"),
                }
            });
        });
    }

    let filters = ctx.filters;
    let on_parent_change = move |ev| {
        let value = event_target_value(&ev);
        let parent_id = if value.is_empty() { None } else { Some(value) };
        filters.update(|f| f.parent_id = parent_id);
    };

    let add_column = {
        let reconciler = ctx.reconciler.clone();
        move |ev: web_sys::SubmitEvent| {
            ev.prevent_default();
            let title = new_column.get();
            if title.trim().is_empty() { return; }
            let reconciler = reconciler.clone();
            spawn_local(async move {
                if reconciler.add_column(&title).await.is_ok() {
                    set_new_column.set(String::new());
                }
            });
        }
    };

    let refresh = {
        let ctx = ctx.clone();
        move |_: web_sys::MouseEvent| ctx.refresh()
    };

    view! {
        <div class="filter-bar">
            <label class="filter-parent">
                "Parent "
                <select on:change=on_parent_change>
                    <option value="" selected=move || filters.with(|f| f.parent_id.is_none())>"All issues"</option>
                    <For
                        each=move || epics.get()
                        key=|epic| epic.id.clone()
                        children=move |epic| {
                            let id = epic.id.clone();
                            let selected = move || filters.with(|f| f.parent_id.as_deref() == Some(id.as_str()));
                            view! {
                                <option value=epic.id.clone() selected=selected>{epic.title}</option>
                            }
                        }
                    />
                </select>
            </label>
            <form class="add-column-form" on:submit=add_column>
                <input
                    type="text"
                    placeholder="Add column..."
                    prop:value=move || new_column.get()
                    on:input=move |ev| set_new_column.set(event_target_value(&ev))
                />
                <button type="submit">"+"</button>
            </form>
            <button class="refresh-btn" title="Refresh" on:click=refresh>"⟳"</button>
        </div>
    }
}
