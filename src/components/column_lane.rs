//! Column Lane Component
//!
//! One board lane: draggable header, droppable body, cards and a new-task input.

use leptos::prelude::*;

use crate::components::{DeleteConfirmButton, NewTaskForm, TaskCard};
use crate::context::use_board_context;
use crate::models::Column;
use crate::reconcile::settle;
use crate::store::{column_tasks, use_board_store, BoardStateStoreFields};

use leptos_dragdrop::*;

#[component]
pub fn ColumnLane(column: Column, dnd: DndSignals) -> impl IntoView {
    let ctx = use_board_context();
    let store = ctx.store;
    let column_id = column.id.clone();
    let item = DragItem::column(column.id.clone());

    // DnD handlers: the header lifts the lane, the whole lane is a drop area
    let on_header_mousedown = make_on_mousedown(dnd, item.clone());
    let on_mouseenter = make_on_mouseenter(dnd, item.clone());
    let on_mouseleave = make_on_mouseleave(dnd, item.clone());

    let lane_tasks = {
        let column_id = column_id.clone();
        move || store.tasks().with(|tasks| column_tasks(tasks, &column_id).into_iter().cloned().collect::<Vec<_>>())
    };
    let task_count = {
        let column_id = column_id.clone();
        move || store.tasks().with(|tasks| column_tasks(tasks, &column_id).len())
    };

    // Visual state
    let is_drop_lane = {
        let column_id = column_id.clone();
        move || store.drop_target().with(|t| t.as_ref().is_some_and(|t| t.column_id == column_id))
    };
    let is_dragging = {
        let item = item.clone();
        move || dnd.is_dragging(&item)
    };
    let lane_class = move || {
        let mut c = String::from("board-column");
        if is_drop_lane() { c.push_str(" drop-target"); }
        if is_dragging() { c.push_str(" dragging"); }
        c
    };

    let rename = {
        let reconciler = ctx.reconciler.clone();
        let column_id = column_id.clone();
        let current = column.title.clone();
        move |_: web_sys::MouseEvent| {
            let Some(win) = web_sys::window() else { return };
            let Ok(Some(title)) = win.prompt_with_message_and_default("Column title", &current) else { return };
            if title.trim().is_empty() || title == current { return; }
            let reconciler = reconciler.clone();
            let column_id = column_id.clone();
            settle(async move { reconciler.rename_column(&column_id, &title).await });
        }
    };

    let remove = {
        let reconciler = ctx.reconciler.clone();
        let column_id = column_id.clone();
        Callback::new(move |_: ()| {
            let reconciler = reconciler.clone();
            let column_id = column_id.clone();
            settle(async move { reconciler.remove_column(&column_id).await });
        })
    };

    view! {
        <section class=lane_class on:mouseenter=on_mouseenter on:mouseleave=on_mouseleave>
            <header class="board-column-header" on:mousedown=on_header_mousedown>
                <span class="board-column-title" on:dblclick=rename>{column.title.clone()}</span>
                <span class="board-column-count">{task_count}</span>
                <DeleteConfirmButton button_class="board-column-remove" label="Remove column" on_confirm=remove />
            </header>
            <div class="board-column-tasks">
                <For
                    each=lane_tasks
                    key=|task| (task.id.clone(), task.title.clone())
                    children=move |task| view! { <TaskCard task=task dnd=dnd /> }
                />
                <DropIndicator column_id=column_id.clone() />
            </div>
            <NewTaskForm column_id=column_id />
        </section>
    }
}

/// Insertion hint shown while a card targets this lane
#[component]
fn DropIndicator(column_id: String) -> impl IntoView {
    let store = use_board_store();
    let target_index = move || {
        store.drop_target().with(|t| t.as_ref().filter(|t| t.column_id == column_id).map(|t| t.index))
    };

    view! {
        {move || target_index().map(|index| view! {
            <div class="drop-indicator">{format!("Drop at position {}", index + 1)}</div>
        })}
    }
}
