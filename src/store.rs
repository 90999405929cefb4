//! Board State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. The store is what
//! the board paints; it is provided per board view, never held globally.

use leptos::prelude::*;
use reactive_stores::Store;
use crate::models::{Column, DropTarget, Task};

/// Renderable board state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct BoardState {
    /// All cards, in display order within each column
    pub tasks: Vec<Task>,
    /// Lanes in display order
    pub columns: Vec<Column>,
    /// Id of the item being dragged; while set, fetched data is not synced in
    pub dragged_task: Option<String>,
    /// Insertion-point hint for rendering only
    pub drop_target: Option<DropTarget>,
    pub project_id: String,
    pub board_id: String,
}

impl BoardState {
    pub fn new(project_id: impl Into<String>, board_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            board_id: board_id.into(),
            ..Default::default()
        }
    }
}

/// Type alias for the store
pub type BoardStore = Store<BoardState>;

/// Get the board store from context
pub fn use_board_store() -> BoardStore {
    expect_context::<BoardStore>()
}

/// Tasks and columns read together
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoardSnapshot {
    pub tasks: Vec<Task>,
    pub columns: Vec<Column>,
}

// ========================
// Store Helper Functions
// ========================

/// Replace the whole task list
pub fn store_set_tasks(store: &BoardStore, tasks: Vec<Task>) {
    store.tasks().set(tasks);
}

/// Replace the whole column list
pub fn store_set_columns(store: &BoardStore, columns: Vec<Column>) {
    store.columns().set(columns);
}

pub fn store_set_dragged_task(store: &BoardStore, id: Option<String>) {
    store.dragged_task().set(id);
}

pub fn store_set_drop_target(store: &BoardStore, target: Option<DropTarget>) {
    if store.drop_target().with_untracked(|current| *current != target) {
        store.drop_target().set(target);
    }
}

/// Remove a task by ID
pub fn store_remove_task(store: &BoardStore, task_id: &str) {
    let tasks = store
        .tasks()
        .with_untracked(|tasks| tasks.iter().filter(|t| t.id != task_id).cloned().collect());
    store_set_tasks(store, tasks);
}

/// Remove a column together with the tasks sitting in it
pub fn store_remove_column(store: &BoardStore, column_id: &str) {
    let snapshot = store_snapshot(store);
    let columns = snapshot.columns.into_iter().filter(|c| c.id != column_id).collect();
    let tasks = snapshot.tasks.into_iter().filter(|t| t.column_id != column_id).collect();
    store_set_columns(store, columns);
    store_set_tasks(store, tasks);
}

/// Point-in-time copy of tasks and columns
pub fn store_snapshot(store: &BoardStore) -> BoardSnapshot {
    BoardSnapshot {
        tasks: store.tasks().get_untracked(),
        columns: store.columns().get_untracked(),
    }
}

pub fn store_restore(store: &BoardStore, snapshot: BoardSnapshot) {
    store_set_columns(store, snapshot.columns);
    store_set_tasks(store, snapshot.tasks);
}

// ========================
// Ordering helpers
// ========================

/// Tasks of one column, in order
pub fn column_tasks<'a>(tasks: &'a [Task], column_id: &str) -> Vec<&'a Task> {
    tasks.iter().filter(|t| t.column_id == column_id).collect()
}

/// Position of a task within its column
pub fn index_in_column(tasks: &[Task], task_id: &str) -> Option<usize> {
    let task = tasks.iter().find(|t| t.id == task_id)?;
    column_tasks(tasks, &task.column_id).iter().position(|t| t.id == task_id)
}

/// Ids of the cards directly above and below a task in its column
pub fn neighbours(tasks: &[Task], task_id: &str) -> Option<(Option<String>, Option<String>)> {
    let task = tasks.iter().find(|t| t.id == task_id)?;
    let column = column_tasks(tasks, &task.column_id);
    let at = column.iter().position(|t| t.id == task_id)?;
    let prev = at.checked_sub(1).map(|i| column[i].id.clone());
    let next = column.get(at + 1).map(|t| t.id.clone());
    Some((prev, next))
}

/// Remove the element at `from` and insert it at `to`
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from >= items.len() || to >= items.len() || from == to {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

/// Place a task in `status` between two neighbours. Returns `None` when an
/// id no longer resolves.
pub fn relocate_task(
    tasks: &[Task],
    task_id: &str,
    status: &str,
    prev: Option<&str>,
    next: Option<&str>,
) -> Option<Vec<Task>> {
    let mut rest: Vec<Task> = tasks.to_vec();
    let from = rest.iter().position(|t| t.id == task_id)?;
    let mut task = rest.remove(from);
    task.column_id = status.to_string();

    let at = match (prev, next) {
        (Some(prev), _) => rest.iter().position(|t| t.id == prev)? + 1,
        (None, Some(next)) => rest.iter().position(|t| t.id == next)?,
        (None, None) => rest.len(),
    };
    rest.insert(at, task);
    Some(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, column: &str) -> Task {
        Task {
            id: id.to_string(),
            title: id.to_string(),
            description: None,
            column_id: column.to_string(),
            parent: None,
        }
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_neighbours_within_column() {
        let tasks = vec![task("A", "todo"), task("X", "done"), task("B", "todo"), task("C", "todo")];
        assert_eq!(neighbours(&tasks, "B"), Some((Some("A".to_string()), Some("C".to_string()))));
        assert_eq!(neighbours(&tasks, "X"), Some((None, None)));
        assert_eq!(neighbours(&tasks, "nope"), None);
        assert_eq!(index_in_column(&tasks, "C"), Some(2));
    }

    #[test]
    fn test_array_move() {
        let mut v = vec!["P", "Q", "R"];
        array_move(&mut v, 0, 2);
        assert_eq!(v, vec!["Q", "R", "P"]);
        array_move(&mut v, 2, 0);
        assert_eq!(v, vec!["P", "Q", "R"]);
        array_move(&mut v, 5, 0);
        assert_eq!(v, vec!["P", "Q", "R"]);
    }

    #[test]
    fn test_relocate_task() {
        let tasks = vec![task("A", "todo"), task("B", "todo"), task("X", "done")];
        let moved = relocate_task(&tasks, "A", "done", None, Some("X")).unwrap();
        assert_eq!(ids(&column_tasks(&moved, "done")), vec!["A", "X"]);
        assert_eq!(ids(&column_tasks(&moved, "todo")), vec!["B"]);

        assert!(relocate_task(&tasks, "A", "done", Some("gone"), None).is_none());
    }

    #[test]
    fn test_remove_column_cascades() {
        let owner = Owner::new();
        owner.set();
        let store = Store::new(BoardState::new("p", "b"));
        store_set_columns(&store, vec![Column::new("todo", "To do"), Column::new("done", "Done")]);
        store_set_tasks(&store, vec![task("A", "todo"), task("X", "done")]);

        store_remove_column(&store, "todo");

        let snapshot = store_snapshot(&store);
        assert_eq!(snapshot.columns, vec![Column::new("done", "Done")]);
        assert_eq!(snapshot.tasks, vec![task("X", "done")]);

        store_remove_task(&store, "X");
        assert!(store.tasks().get_untracked().is_empty());
    }
}
