//! Pointer drag sessions.
//!
//! A session is either idle or dragging one element. Pointer positions are
//! absolute document coordinates; the session turns them into deltas from
//! the start point and drives the constraint solver:
//!
//! | call           | solver mode | document effect            |
//! |----------------|-------------|----------------------------|
//! | `process_drag` | preview     | transient display only     |
//! | `stop_drag`    | commit      | one applied command group  |
//! | `cancel_drag`  | none        | display reverts            |

use rl_core::{
    CommandGroup, Document, DragOutcome, Gesture, LayoutConfig, ObjectId, Offset, Rect,
};

/// State of the element being dragged.
#[derive(Debug, Clone, PartialEq)]
pub struct Drag {
    pub element: ObjectId,
    pub gesture: Gesture,
    /// Container the element was in when the drag started.
    pub origin_container: Option<ObjectId>,
    /// Committed geometry at drag start.
    pub origin_rect: Rect,
    start_x: f32,
    start_y: f32,
    /// Legal delta of the last processed pointer position.
    pub diff: Offset,
    /// Drop target under the pointer, for moves.
    pub drop_target: Option<ObjectId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(Drag),
}

#[derive(Debug, Default)]
pub struct DragSession {
    state: DragState,
    grid: f32,
}

impl DragSession {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            state: DragState::Idle,
            grid: config.grid(),
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Element being dragged, if any.
    pub fn dragged(&self) -> Option<ObjectId> {
        match &self.state {
            DragState::Dragging(drag) => Some(drag.element),
            DragState::Idle => None,
        }
    }

    /// Begin dragging `element` from pointer position `x`/`y`.
    ///
    /// Refused for elements that cannot be moved (moves) or that do not
    /// show the handle (resizes). A drag already in progress is cancelled.
    pub fn start_drag(
        &mut self,
        doc: &mut Document,
        element: ObjectId,
        x: f32,
        y: f32,
        gesture: Gesture,
    ) -> bool {
        if self.is_dragging() {
            self.cancel_drag(doc);
        }
        let Some(el) = doc.element(element) else {
            return false;
        };
        let caps = el.kind.capabilities();
        let allowed = match gesture {
            Gesture::Move => caps.draggable,
            Gesture::Resize(handle) => caps.sizers.contains(&handle),
        };
        if !allowed {
            log::debug!("{element}: {gesture:?} not available for {}", el.kind.as_str());
            return false;
        }
        self.state = DragState::Dragging(Drag {
            element,
            gesture,
            origin_container: el.container_id,
            origin_rect: el.rect(),
            start_x: x,
            start_y: y,
            diff: Offset::ZERO,
            drop_target: el.container_id,
        });
        true
    }

    /// Preview the drag at pointer position `x`/`y`. Returns the previewed
    /// rectangle.
    pub fn process_drag(&mut self, doc: &mut Document, x: f32, y: f32) -> Option<Rect> {
        let DragState::Dragging(drag) = &mut self.state else {
            return None;
        };
        drag.diff = doc.drag_diff(
            drag.element,
            x - drag.start_x,
            y - drag.start_y,
            drag.gesture,
            self.grid,
        );
        if drag.gesture == Gesture::Move {
            drag.drop_target = doc.drop_container_at(x, y, drag.element);
        }
        match doc.update_drag(drag.element, drag.diff.x, drag.diff.y, drag.gesture, None, None) {
            DragOutcome::Preview(rect) => Some(rect),
            _ => None,
        }
    }

    /// Finish the drag, dropping into `drop` (`None`: the container under
    /// the pointer for moves, the current container for resizes). Returns
    /// the applied group, empty when nothing changed, the drop was refused
    /// or a move ended outside every container.
    pub fn stop_drag(&mut self, doc: &mut Document, drop: Option<ObjectId>) -> CommandGroup {
        let DragState::Dragging(drag) = std::mem::take(&mut self.state) else {
            return CommandGroup::default();
        };
        let description = match drag.gesture {
            Gesture::Move => "move element".to_string(),
            Gesture::Resize(handle) => format!("resize element ({})", handle.as_str()),
        };
        let mut group = CommandGroup::new(description);
        let drop = match (drop, drag.gesture) {
            (Some(drop), _) => Some(drop),
            (None, Gesture::Resize(_)) => None,
            (None, Gesture::Move) => match drag.drop_target {
                Some(target) => Some(target),
                None => {
                    log::debug!("{}: dropped outside every container", drag.element);
                    doc.request_display(drag.element);
                    return group;
                }
            },
        };
        doc.update_drag(
            drag.element,
            drag.diff.x,
            drag.diff.y,
            drag.gesture,
            drop,
            Some(&mut group),
        );
        group.apply(doc);
        group
    }

    /// Abandon the drag and redraw the element at its committed geometry.
    pub fn cancel_drag(&mut self, doc: &mut Document) {
        if let DragState::Dragging(drag) = std::mem::take(&mut self.state) {
            doc.request_display(drag.element);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rl_core::{BandType, DocElement, ElementKind, FieldValue, Handle};

    fn id(s: &str) -> ObjectId {
        ObjectId::intern(s)
    }

    fn doc() -> Document {
        let mut doc = Document::new();
        doc.add_band(id("ses_band"), BandType::Content, Rect::new(0.0, 0.0, 300.0, 200.0));
        let el = DocElement::new(id("ses_el"), ElementKind::Text)
            .with_value("width", FieldValue::text("100"))
            .with_value("height", FieldValue::text("50"));
        doc.add_element(el, Some(id("ses_band")), None).unwrap();
        doc
    }

    #[test]
    fn idle_session_ignores_input() {
        let mut doc = doc();
        let mut session = DragSession::new(&LayoutConfig::default());
        assert_eq!(session.process_drag(&mut doc, 10.0, 10.0), None);
        assert!(session.stop_drag(&mut doc, None).is_empty());
    }

    #[test]
    fn resize_gesture() {
        let mut doc = doc();
        let mut session = DragSession::new(&LayoutConfig::default());
        assert!(session.start_drag(&mut doc, id("ses_el"), 100.0, 50.0, Gesture::Resize(Handle::SE)));
        let preview = session.process_drag(&mut doc, 147.0, 73.0);
        assert_eq!(preview, Some(Rect::new(0.0, 0.0, 150.0, 70.0)));
        assert_eq!(doc.element(id("ses_el")).unwrap().width_val, 100.0);

        let group = session.stop_drag(&mut doc, None);
        assert_eq!(group.fields_for(id("ses_el")), vec!["width", "height"]);
        assert_eq!(
            doc.element(id("ses_el")).unwrap().rect(),
            Rect::new(0.0, 0.0, 150.0, 70.0)
        );
        assert!(!session.is_dragging());
    }

    #[test]
    fn cancel_restores_display() {
        let mut doc = doc();
        let mut session = DragSession::new(&LayoutConfig::default());
        session.start_drag(&mut doc, id("ses_el"), 10.0, 10.0, Gesture::Move);
        session.process_drag(&mut doc, 50.0, 50.0);
        session.cancel_drag(&mut doc);
        assert_eq!(
            doc.pending_geometry(id("ses_el")),
            Some(Rect::new(0.0, 0.0, 100.0, 50.0))
        );
        assert_eq!(session.state(), &DragState::Idle);
    }

    #[test]
    fn move_outside_every_container_commits_nothing() {
        let mut doc = doc();
        let mut session = DragSession::new(&LayoutConfig::default());
        session.start_drag(&mut doc, id("ses_el"), 10.0, 10.0, Gesture::Move);
        session.process_drag(&mut doc, 500.0, 20.0);
        doc.take_display_requests();

        assert!(session.stop_drag(&mut doc, None).is_empty());
        assert_eq!(
            doc.pending_geometry(id("ses_el")),
            Some(Rect::new(0.0, 0.0, 100.0, 50.0))
        );
    }

    #[test]
    fn unavailable_handle_is_refused() {
        let mut doc = doc();
        let table = DocElement::new(id("ses_table"), ElementKind::Table);
        doc.add_element(table, Some(id("ses_band")), None).unwrap();
        let mut session = DragSession::new(&LayoutConfig::default());
        assert!(!session.start_drag(&mut doc, id("ses_table"), 0.0, 0.0, Gesture::Resize(Handle::E)));
        assert!(session.start_drag(&mut doc, id("ses_table"), 0.0, 0.0, Gesture::Move));
    }
}
