//! Leptos DragDrop Utilities
//!
//! Pointer-driven drag-and-drop for sortable boards using mouse events.
//! A movement threshold distinguishes click from drag. Hovered droppables are
//! kept as a stack so a card inside a lane resolves to the innermost one, and
//! Escape cancels the gesture.
//!
//! [`DragTracker`] holds all gesture state and is plain Rust; the `make_on_*`
//! and `bind_global_listeners` functions only feed DOM events into it.

use leptos::prelude::*;
use wasm_bindgen::JsCast;

/// What is being dragged, or hovered
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DragKind {
    Task,
    Column,
}

/// A draggable or droppable element
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DragItem {
    pub id: String,
    pub kind: DragKind,
}

impl DragItem {
    pub fn task(id: impl Into<String>) -> Self {
        Self { id: id.into(), kind: DragKind::Task }
    }

    pub fn column(id: impl Into<String>) -> Self {
        Self { id: id.into(), kind: DragKind::Column }
    }
}

/// Gesture lifecycle notifications
#[derive(Clone, Debug, PartialEq)]
pub enum DragEvent {
    Start { active: DragItem },
    Over { active: DragItem, over: Option<DragItem> },
    End { active: DragItem, over: Option<DragItem> },
    Cancel { active: DragItem },
}

/// Movement threshold in pixels to start dragging
pub const DRAG_THRESHOLD_PX: i32 = 5;

/// Gesture state machine, independent of the DOM
#[derive(Clone, Debug, Default)]
pub struct DragTracker {
    /// Pressed but not yet moved past the threshold
    pending: Option<(DragItem, i32, i32)>,
    active: Option<DragItem>,
    /// Innermost hovered droppable last
    hovered: Vec<DragItem>,
    /// `over` as last announced to the handler
    reported_over: Option<DragItem>,
}

impl DragTracker {
    pub fn active(&self) -> Option<&DragItem> {
        self.active.as_ref()
    }

    pub fn over(&self) -> Option<&DragItem> {
        self.hovered.last()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Pointer pressed on a draggable
    pub fn press(&mut self, item: DragItem, x: i32, y: i32) {
        if self.active.is_none() {
            self.pending = Some((item, x, y));
        }
    }

    /// Pointer moved anywhere in the document
    pub fn motion(&mut self, x: i32, y: i32) -> Option<DragEvent> {
        if let Some(active) = &self.active {
            let over = self.hovered.last().cloned();
            if over != self.reported_over {
                self.reported_over = over.clone();
                return Some(DragEvent::Over { active: active.clone(), over });
            }
            return None;
        }

        let (item, start_x, start_y) = self.pending.as_ref()?;
        let dx = (x - start_x).abs();
        let dy = (y - start_y).abs();
        if dx <= DRAG_THRESHOLD_PX && dy <= DRAG_THRESHOLD_PX {
            return None;
        }
        let active = item.clone();
        self.pending = None;
        self.active = Some(active.clone());
        self.reported_over = self.hovered.last().cloned();
        Some(DragEvent::Start { active })
    }

    /// Pointer entered a droppable
    pub fn enter(&mut self, item: DragItem) {
        self.hovered.retain(|h| h != &item);
        self.hovered.push(item);
    }

    /// Pointer left a droppable; anything entered inside it is left too
    pub fn leave(&mut self, item: &DragItem) {
        if let Some(pos) = self.hovered.iter().position(|h| h == item) {
            self.hovered.truncate(pos);
        }
    }

    /// Pointer released
    pub fn release(&mut self) -> Option<DragEvent> {
        self.pending = None;
        let active = self.active.take()?;
        self.reported_over = None;
        Some(DragEvent::End { active, over: self.hovered.last().cloned() })
    }

    /// Escape pressed
    pub fn cancel(&mut self) -> Option<DragEvent> {
        self.pending = None;
        let active = self.active.take()?;
        self.reported_over = None;
        Some(DragEvent::Cancel { active })
    }
}

/// DnD state shared by the board's elements
#[derive(Clone, Copy)]
pub struct DndSignals {
    tracker: StoredValue<DragTracker>,
    /// Item currently dragged (for styling)
    pub active: RwSignal<Option<DragItem>>,
    /// Innermost hovered droppable while dragging
    pub over: RwSignal<Option<DragItem>>,
}

pub fn create_dnd_signals() -> DndSignals {
    DndSignals {
        tracker: StoredValue::new(DragTracker::default()),
        active: RwSignal::new(None),
        over: RwSignal::new(None),
    }
}

impl DndSignals {
    /// Apply a tracker step and mirror the result into the render signals
    fn step<U>(&self, f: impl FnOnce(&mut DragTracker) -> U) -> Option<U> {
        let out = self.tracker.try_update_value(f);
        let (active, over) = self.tracker.with_value(|t| {
            let active = t.active().cloned();
            let over = if active.is_some() { t.over().cloned() } else { None };
            (active, over)
        });
        if self.active.get_untracked() != active {
            self.active.set(active);
        }
        if self.over.get_untracked() != over {
            self.over.set(over);
        }
        out
    }

    pub fn is_dragging(&self, item: &DragItem) -> bool {
        self.active.with(|a| a.as_ref() == Some(item))
    }

    pub fn is_over(&self, item: &DragItem) -> bool {
        self.over.with(|o| o.as_ref() == Some(item))
    }
}

/// Create mousedown handler for draggable elements
/// Records pending drag with start position
pub fn make_on_mousedown(dnd: DndSignals, item: DragItem) -> impl Fn(web_sys::MouseEvent) + Clone + 'static {
    move |ev: web_sys::MouseEvent| {
        if ev.button() != 0 {
            return;
        }
        // Ignore if target is input or button
        if let Some(target) = ev.target() {
            if target.dyn_ref::<web_sys::HtmlInputElement>().is_some() { return; }
            if target.dyn_ref::<web_sys::HtmlButtonElement>().is_some() { return; }
        }
        // Cards sit inside lanes; the innermost draggable wins
        ev.stop_propagation();
        let item = item.clone();
        let (x, y) = (ev.client_x(), ev.client_y());
        dnd.step(move |t| t.press(item, x, y));
    }
}

/// Create mouseenter handler for droppable elements
pub fn make_on_mouseenter(dnd: DndSignals, item: DragItem) -> impl Fn(web_sys::MouseEvent) + Clone + 'static {
    move |_ev: web_sys::MouseEvent| {
        let item = item.clone();
        dnd.step(move |t| t.enter(item));
    }
}

/// Create mouseleave handler for droppable elements
pub fn make_on_mouseleave(dnd: DndSignals, item: DragItem) -> impl Fn(web_sys::MouseEvent) + Clone + 'static {
    move |_ev: web_sys::MouseEvent| {
        dnd.step(|t| t.leave(&item));
    }
}

/// Bind document-level mousemove, mouseup and Escape handling.
/// Every gesture notification goes through `on_event`.
pub fn bind_global_listeners<F>(dnd: DndSignals, on_event: F)
where
    F: Fn(DragEvent) + Clone + 'static,
{
    use wasm_bindgen::closure::Closure;

    let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
        tracing::warn!("no document; drag and drop disabled");
        return;
    };

    let on_move = on_event.clone();
    let on_mousemove = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        let (x, y) = (ev.client_x(), ev.client_y());
        if let Some(event) = dnd.step(|t| t.motion(x, y)).flatten() {
            on_move(event);
        }
    });

    let on_up = on_event.clone();
    let on_mouseup = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_ev: web_sys::MouseEvent| {
        if let Some(event) = dnd.step(|t| t.release()).flatten() {
            on_up(event);
        }
    });

    let on_key = on_event;
    let on_keydown = Closure::<dyn FnMut(web_sys::KeyboardEvent)>::new(move |ev: web_sys::KeyboardEvent| {
        if ev.key() != "Escape" {
            return;
        }
        if let Some(event) = dnd.step(|t| t.cancel()).flatten() {
            on_key(event);
        }
    });

    let _ = doc.add_event_listener_with_callback("mousemove", on_mousemove.as_ref().unchecked_ref());
    let _ = doc.add_event_listener_with_callback("mouseup", on_mouseup.as_ref().unchecked_ref());
    let _ = doc.add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref());
    on_mousemove.forget();
    on_mouseup.forget();
    on_keydown.forget();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_without_motion_is_not_a_drag() {
        let mut t = DragTracker::default();
        t.press(DragItem::task("A"), 10, 10);
        assert_eq!(t.motion(12, 13), None);
        assert!(t.is_pending());
        assert_eq!(t.release(), None);
        assert!(!t.is_pending());
    }

    #[test]
    fn test_threshold_starts_drag() {
        let mut t = DragTracker::default();
        t.enter(DragItem::column("todo"));
        t.enter(DragItem::task("A"));
        t.press(DragItem::task("A"), 0, 0);

        assert_eq!(t.motion(0, 6), Some(DragEvent::Start { active: DragItem::task("A") }));
        assert_eq!(t.active(), Some(&DragItem::task("A")));
        // Still over itself: nothing new to report
        assert_eq!(t.motion(0, 8), None);
    }

    #[test]
    fn test_hover_stack_resolves_innermost() {
        let mut t = DragTracker::default();
        t.press(DragItem::task("A"), 0, 0);
        t.motion(20, 0);

        t.enter(DragItem::column("done"));
        assert_eq!(
            t.motion(21, 0),
            Some(DragEvent::Over { active: DragItem::task("A"), over: Some(DragItem::column("done")) })
        );

        t.enter(DragItem::task("Y"));
        assert_eq!(
            t.motion(22, 0),
            Some(DragEvent::Over { active: DragItem::task("A"), over: Some(DragItem::task("Y")) })
        );

        // Leaving the card falls back to the lane it sits in
        t.leave(&DragItem::task("Y"));
        assert_eq!(t.over(), Some(&DragItem::column("done")));

        // Leaving the lane drops everything inside it
        t.enter(DragItem::task("X"));
        t.leave(&DragItem::column("done"));
        assert_eq!(
            t.motion(30, 0),
            Some(DragEvent::Over { active: DragItem::task("A"), over: None })
        );
    }

    #[test]
    fn test_release_reports_over() {
        let mut t = DragTracker::default();
        t.press(DragItem::column("todo"), 0, 0);
        t.motion(50, 0);
        t.enter(DragItem::column("done"));

        assert_eq!(
            t.release(),
            Some(DragEvent::End { active: DragItem::column("todo"), over: Some(DragItem::column("done")) })
        );
        assert!(t.active().is_none());
        assert_eq!(t.release(), None);
    }

    #[test]
    fn test_cancel_only_while_dragging() {
        let mut t = DragTracker::default();
        assert_eq!(t.cancel(), None);

        t.press(DragItem::task("A"), 0, 0);
        t.motion(0, 40);
        assert_eq!(t.cancel(), Some(DragEvent::Cancel { active: DragItem::task("A") }));
        assert_eq!(t.motion(0, 80), None);
    }

    #[test]
    fn test_press_ignored_mid_drag() {
        let mut t = DragTracker::default();
        t.press(DragItem::task("A"), 0, 0);
        t.motion(10, 10);
        t.press(DragItem::task("B"), 10, 10);
        assert!(!t.is_pending());
        assert_eq!(t.active(), Some(&DragItem::task("A")));
    }
}
