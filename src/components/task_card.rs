//! Task Card Component

use leptos::prelude::*;

use crate::components::DeleteConfirmButton;
use crate::context::use_board_context;
use crate::models::Task;
use crate::reconcile::settle;
use crate::store::{column_tasks, BoardStateStoreFields};

use leptos_dragdrop::*;

#[component]
pub fn TaskCard(task: Task, dnd: DndSignals) -> impl IntoView {
    let ctx = use_board_context();
    let store = ctx.store;
    let id = task.id.clone();
    let item = DragItem::task(task.id.clone());

    // DnD handlers
    let on_mousedown = make_on_mousedown(dnd, item.clone());
    let on_mouseenter = make_on_mouseenter(dnd, item.clone());
    let on_mouseleave = make_on_mouseleave(dnd, item.clone());

    // Visual state
    let card_class = {
        let item = item.clone();
        move || {
            let mut c = String::from("task-card");
            if dnd.is_dragging(&item) { c.push_str(" dragging"); }
            if dnd.is_over(&item) { c.push_str(" drop-target"); }
            c
        }
    };

    // Send the card to the bottom of the next lane
    let move_right = {
        let reconciler = ctx.reconciler.clone();
        let id = id.clone();
        move |ev: web_sys::MouseEvent| {
            ev.stop_propagation();
            let columns = store.columns().get_untracked();
            let tasks = store.tasks().get_untracked();
            let Some(current) = tasks.iter().find(|t| t.id == id).map(|t| t.column_id.clone()) else { return };
            let Some(at) = columns.iter().position(|c| c.id == current) else { return };
            let Some(next) = columns.get(at + 1).map(|c| c.id.clone()) else { return };
            let prev = column_tasks(&tasks, &next).last().map(|t| t.id.clone());

            let reconciler = reconciler.clone();
            let id = id.clone();
            settle(async move { reconciler.move_task(&id, &next, prev.as_deref(), None).await });
        }
    };
    let is_last_lane = {
        let id = id.clone();
        move || {
            let column = store.tasks().with(|tasks| tasks.iter().find(|t| t.id == id).map(|t| t.column_id.clone()));
            store.columns().with(|cols| cols.last().map(|c| c.id.clone()) == column)
        }
    };

    let delete = {
        let reconciler = ctx.reconciler.clone();
        let id = id.clone();
        Callback::new(move |_: ()| {
            let reconciler = reconciler.clone();
            let id = id.clone();
            settle(async move { reconciler.delete_task(&id).await });
        })
    };

    let parent = task.parent.clone().map(|parent| {
        view! {
            <span class=format!("task-parent task-parent-{}", parent.issue_type) title=parent.id.clone()>
                {parent.title}
            </span>
        }
    });

    view! {
        <article
            class=card_class
            on:mousedown=on_mousedown
            on:mouseenter=on_mouseenter
            on:mouseleave=on_mouseleave
        >
            <div class="task-card-title">{task.title.clone()}</div>
            {task.description.clone().map(|text| view! { <p class="task-card-description">{text}</p> })}
            <footer class="task-card-footer">
                <span class="task-card-id">{id.clone()}</span>
                {parent}
                <button
                    class="task-card-action"
                    title="Move to next column"
                    disabled=is_last_lane
                    on:click=move_right
                >
                    "→"
                </button>
                <DeleteConfirmButton button_class="task-card-action" label="Delete task" on_confirm=delete />
            </footer>
        </article>
    }
}
