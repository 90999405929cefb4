//! Drag Session Controller
//!
//! Turns drag framework events into live store previews and, on release, into
//! a [`GestureCommit`] for the reconciler. Nothing here touches the network.
//!
//! Lifecycle: `Idle -> Dragging(Task | Column) -> Idle`, or back to `Idle`
//! through cancel, which restores the board as it was at drag start.

use leptos::prelude::*;
use leptos_dragdrop::{DragEvent, DragItem, DragKind};

use crate::models::{Column, DropTarget, MoveIssue, Task};
use crate::store::{
    array_move, index_in_column, neighbours, store_restore, store_set_columns,
    store_set_dragged_task, store_set_drop_target, store_set_tasks, store_snapshot,
    BoardSnapshot, BoardStateStoreFields, BoardStore,
};

/// What is being dragged
#[derive(Clone, Debug, PartialEq)]
pub enum DragPayload {
    Task(Task),
    Column(Column),
}

impl DragPayload {
    pub fn id(&self) -> &str {
        match self {
            DragPayload::Task(task) => &task.id,
            DragPayload::Column(column) => &column.id,
        }
    }
}

/// Where a task ended up during the drag, not yet sent
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingMove {
    pub status: String,
    pub index_in_column: usize,
}

/// A resolved move, ready for the server
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskMove {
    pub task_id: String,
    pub status: String,
    pub prev_issue_id: Option<String>,
    pub next_issue_id: Option<String>,
}

impl TaskMove {
    pub fn to_request(&self, board_id: &str) -> MoveIssue {
        MoveIssue {
            issue_id: self.task_id.clone(),
            board_id: Some(board_id.to_string()),
            status: self.status.clone(),
            prev_issue_id: self.prev_issue_id.clone(),
            next_issue_id: self.next_issue_id.clone(),
        }
    }
}

/// Everything one gesture wants persisted, plus the board before it started
#[derive(Clone, Debug, PartialEq)]
pub struct GestureCommit {
    pub moves: Vec<TaskMove>,
    /// Full column list when a lane changed position
    pub column_reorder: Option<Vec<Column>>,
    pub snapshot: BoardSnapshot,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging(DragPayload),
}

#[derive(Clone, Debug, Default)]
struct DragSession {
    phase: DragPhase,
    /// Start column and index; for lane drags the column itself
    origin: Option<(String, usize)>,
    snapshot: BoardSnapshot,
    /// Insertion order, one entry per task
    pending: Vec<(String, PendingMove)>,
    /// Hover target the preview was last computed for
    last_over: Option<DragItem>,
}

impl DragSession {
    fn queue(&mut self, task_id: &str, pending_move: PendingMove) {
        match self.pending.iter_mut().find(|(id, _)| id == task_id) {
            Some(entry) => entry.1 = pending_move,
            None => self.pending.push((task_id.to_string(), pending_move)),
        }
    }
}

#[derive(Clone, Copy)]
pub struct DragController {
    store: BoardStore,
    session: StoredValue<DragSession>,
    /// Payload of the live drag, for rendering the lifted card or lane
    pub active: RwSignal<Option<DragPayload>>,
}

impl DragController {
    pub fn new(store: BoardStore) -> Self {
        Self {
            store,
            session: StoredValue::new(DragSession::default()),
            active: RwSignal::new(None),
        }
    }

    pub fn phase(&self) -> DragPhase {
        self.session.with_value(|s| s.phase.clone())
    }

    pub fn pending_moves(&self) -> Vec<(String, PendingMove)> {
        self.session.with_value(|s| s.pending.clone())
    }

    /// Feed one framework event through the state machine
    pub fn handle(&self, event: DragEvent) -> Option<GestureCommit> {
        match event {
            DragEvent::Start { active } => {
                self.drag_start(&active);
                None
            }
            DragEvent::Over { over, .. } => {
                self.drag_over(over.as_ref());
                None
            }
            DragEvent::End { over, .. } => {
                // Release over an already previewed target must not apply it twice
                if self.session.with_value(|s| s.last_over != over) {
                    self.drag_over(over.as_ref());
                }
                self.drag_end()
            }
            DragEvent::Cancel { .. } => {
                self.drag_cancel();
                None
            }
        }
    }

    pub fn drag_start(&self, item: &DragItem) -> bool {
        if self.phase() != DragPhase::Idle {
            tracing::warn!(id = %item.id, "drag start while another drag is live");
            return false;
        }

        let snapshot = store_snapshot(&self.store);
        let started = match item.kind {
            DragKind::Task => snapshot.tasks.iter().find(|t| t.id == item.id).map(|task| {
                let index = index_in_column(&snapshot.tasks, &task.id).unwrap_or(0);
                (DragPayload::Task(task.clone()), (task.column_id.clone(), index))
            }),
            DragKind::Column => snapshot
                .columns
                .iter()
                .position(|c| c.id == item.id)
                .map(|index| {
                    let column = snapshot.columns[index].clone();
                    (DragPayload::Column(column), (item.id.clone(), index))
                }),
        };
        let Some((payload, origin)) = started else {
            tracing::warn!(id = %item.id, kind = ?item.kind, "drag start on unknown item");
            return false;
        };

        tracing::debug!(id = %item.id, kind = ?item.kind, column = %origin.0, index = origin.1, "drag start");
        self.session.set_value(DragSession {
            phase: DragPhase::Dragging(payload.clone()),
            origin: Some(origin),
            snapshot,
            pending: Vec::new(),
            last_over: None,
        });
        self.active.set(Some(payload));
        store_set_dragged_task(&self.store, Some(item.id.clone()));
        true
    }

    /// Recompute the live preview for the current hover
    pub fn drag_over(&self, over: Option<&DragItem>) {
        let payload = self.session.with_value(|s| match &s.phase {
            DragPhase::Dragging(payload) => Some(payload.clone()),
            DragPhase::Idle => None,
        });
        let Some(payload) = payload else {
            return;
        };
        self.session.update_value(|s| s.last_over = over.cloned());
        let Some(over) = over else {
            store_set_drop_target(&self.store, None);
            return;
        };

        match payload {
            DragPayload::Task(task) => self.task_over(&task.id, over),
            DragPayload::Column(column) => self.column_over(&column.id, over),
        }
    }

    fn task_over(&self, active_id: &str, over: &DragItem) {
        let mut tasks = self.store.tasks().get_untracked();
        let Some(from) = tasks.iter().position(|t| t.id == active_id) else {
            tracing::warn!(task = %active_id, "dragged task is no longer on the board");
            return;
        };
        let current_column = tasks[from].column_id.clone();

        match over.kind {
            DragKind::Column => {
                let known = self.store.columns().with_untracked(|cols| cols.iter().any(|c| c.id == over.id));
                if !known {
                    tracing::warn!(column = %over.id, "hovered column is no longer on the board");
                    return;
                }
                let count = tasks.iter().filter(|t| t.column_id == over.id && t.id != active_id).count();
                store_set_drop_target(&self.store, Some(DropTarget { column_id: over.id.clone(), index: count }));
                if current_column == over.id {
                    return;
                }

                let mut task = tasks.remove(from);
                task.column_id = over.id.clone();
                tasks.push(task);
                store_set_tasks(&self.store, tasks);
                self.queue(active_id, PendingMove { status: over.id.clone(), index_in_column: count });
            }
            DragKind::Task => {
                if over.id == active_id {
                    return;
                }
                let Some(to) = tasks.iter().position(|t| t.id == over.id) else {
                    tracing::warn!(task = %over.id, "hovered task is no longer on the board");
                    return;
                };
                let over_column = tasks[to].column_id.clone();
                let over_index = index_in_column(&tasks, &over.id).unwrap_or(0);
                store_set_drop_target(
                    &self.store,
                    Some(DropTarget { column_id: over_column.clone(), index: over_index }),
                );

                if current_column != over_column {
                    // Take it out, then slot it in right before the hovered card
                    let mut task = tasks.remove(from);
                    task.column_id = over_column.clone();
                    let at = tasks.iter().position(|t| t.id == over.id).unwrap_or(tasks.len());
                    tasks.insert(at, task);
                } else {
                    array_move(&mut tasks, from, to);
                }

                let index = index_in_column(&tasks, active_id).unwrap_or(0);
                store_set_tasks(&self.store, tasks);
                self.queue(active_id, PendingMove { status: over_column, index_in_column: index });
            }
        }
    }

    /// Lanes reorder live; hovering a card counts as hovering its lane
    fn column_over(&self, active_id: &str, over: &DragItem) {
        let target = match over.kind {
            DragKind::Column => Some(over.id.clone()),
            DragKind::Task => self.store.tasks().with_untracked(|tasks| {
                tasks.iter().find(|t| t.id == over.id).map(|t| t.column_id.clone())
            }),
        };
        let Some(target) = target else {
            tracing::warn!(id = %over.id, "hovered item is no longer on the board");
            return;
        };
        if target == active_id {
            return;
        }

        let mut columns = self.store.columns().get_untracked();
        let from = columns.iter().position(|c| c.id == active_id);
        let to = columns.iter().position(|c| c.id == target);
        let (Some(from), Some(to)) = (from, to) else {
            tracing::warn!(column = %active_id, target = %target, "column reorder against a stale board");
            return;
        };
        array_move(&mut columns, from, to);
        store_set_columns(&self.store, columns);
    }

    fn queue(&self, task_id: &str, pending_move: PendingMove) {
        tracing::debug!(task = %task_id, status = %pending_move.status, index = pending_move.index_in_column, "move queued");
        self.session.update_value(|s| s.queue(task_id, pending_move));
    }

    fn take_session(&self) -> DragSession {
        let session = self.session.with_value(DragSession::clone);
        self.session.set_value(DragSession::default());
        session
    }

    fn clear_markers(&self) {
        store_set_drop_target(&self.store, None);
        self.active.set(None);
        store_set_dragged_task(&self.store, None);
    }

    /// Finish the gesture. The pending queue is emptied before anything is
    /// returned, so a repeated end yields nothing.
    pub fn drag_end(&self) -> Option<GestureCommit> {
        let DragSession { phase, origin, snapshot, pending, .. } = self.take_session();
        self.clear_markers();
        let DragPhase::Dragging(payload) = phase else {
            return None;
        };

        let tasks = self.store.tasks().get_untracked();
        let mut moves = Vec::new();
        let mut column_reorder = None;

        match &payload {
            DragPayload::Task(_) => {
                for (task_id, _) in pending {
                    let Some(status) = tasks.iter().find(|t| t.id == task_id).map(|t| t.column_id.clone()) else {
                        tracing::warn!(task = %task_id, "moved task vanished before drop");
                        continue;
                    };
                    let Some((prev, next)) = neighbours(&tasks, &task_id) else {
                        continue;
                    };
                    let unchanged = snapshot.tasks.iter().any(|t| t.id == task_id && t.column_id == status)
                        && neighbours(&snapshot.tasks, &task_id) == Some((prev.clone(), next.clone()));
                    if unchanged {
                        continue;
                    }
                    moves.push(TaskMove { task_id, status, prev_issue_id: prev, next_issue_id: next });
                }
            }
            DragPayload::Column(column) => {
                let columns = self.store.columns().get_untracked();
                let start = origin.map(|(_, index)| index);
                let end = columns.iter().position(|c| c.id == column.id);
                if end.is_some() && end != start {
                    column_reorder = Some(columns);
                }
            }
        }

        if moves.is_empty() && column_reorder.is_none() {
            if store_snapshot(&self.store) != snapshot {
                store_restore(&self.store, snapshot);
            }
            tracing::debug!(id = %payload.id(), "drop in place");
            return None;
        }

        tracing::debug!(id = %payload.id(), moves = moves.len(), reorder = column_reorder.is_some(), "drag end");
        Some(GestureCommit { moves, column_reorder, snapshot })
    }

    /// Abandon the gesture: queued moves are dropped and the board goes back
    /// to how it looked at drag start.
    pub fn drag_cancel(&self) {
        let session = self.take_session();
        self.clear_markers();
        if let DragPhase::Dragging(payload) = session.phase {
            tracing::debug!(id = %payload.id(), discarded = session.pending.len(), "drag cancelled");
            store_restore(&self.store, session.snapshot);
        }
    }
}
