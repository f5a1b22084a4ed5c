//! Drag and resize constraints.
//!
//! A pointer gesture reduces to `(dx, dy, gesture)`. [`Document::drag_diff`]
//! turns raw pointer deltas into legal, grid-snapped deltas;
//! [`Document::update_drag`] applies them either as a transient preview or,
//! when given a [`CommandGroup`], as a commit that bounds-checks the result
//! and possibly moves the element into another container.

use crate::command::{Command, CommandGroup, ElementSnapshot, ValueKind};
use crate::document::Document;
use crate::id::ObjectId;
use crate::model::FieldValue;
use crate::units::{
    Offset, Rect, Size, format_number, round_to_interval, round_to_lower_interval,
    round_to_upper_interval,
};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Side of an element rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    North,
    East,
    South,
    West,
}

/// Resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handle {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Handle {
    /// Edges moved by this handle.
    pub fn edges(self) -> SmallVec<[Edge; 2]> {
        let mut edges = SmallVec::new();
        if matches!(self, Handle::NW | Handle::N | Handle::NE) {
            edges.push(Edge::North);
        }
        if matches!(self, Handle::NE | Handle::E | Handle::SE) {
            edges.push(Edge::East);
        }
        if matches!(self, Handle::SE | Handle::S | Handle::SW) {
            edges.push(Edge::South);
        }
        if matches!(self, Handle::SW | Handle::W | Handle::NW) {
            edges.push(Edge::West);
        }
        edges
    }

    pub fn touches(self, edge: Edge) -> bool {
        self.edges().contains(&edge)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Handle::N => "N",
            Handle::NE => "NE",
            Handle::E => "E",
            Handle::SE => "SE",
            Handle::S => "S",
            Handle::SW => "SW",
            Handle::W => "W",
            Handle::NW => "NW",
        }
    }
}

/// What a pointer gesture does to the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Move the whole element.
    Move,
    /// Drag one resize handle.
    Resize(Handle),
}

impl Gesture {
    fn touches(self, edge: Edge) -> bool {
        match self {
            Gesture::Move => false,
            Gesture::Resize(handle) => handle.touches(edge),
        }
    }
}

/// Result of [`Document::update_drag`].
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// Preview drawn at this rectangle (container relative).
    Preview(Rect),
    /// Commit; the group holds the commands, possibly none.
    Committed,
    /// Drop target refuses the element kind.
    Rejected,
}

impl Document {
    /// Clamp `rect` into a container of `container_size` and append a
    /// command for every field that changes and that the element's kind
    /// declares. Elements nested in the linked container are checked
    /// against the new size.
    ///
    /// Overflow to the right or bottom is fixed by moving the element
    /// first and by shrinking it only when moving is not enough.
    pub fn check_bounds(
        &self,
        id: ObjectId,
        rect: Rect,
        container_size: Size,
        group: &mut CommandGroup,
    ) {
        let Some(el) = self.element(id) else {
            return;
        };
        let Rect {
            mut x,
            mut y,
            mut width,
            mut height,
        } = rect;

        if x + width > container_size.width {
            x = container_size.width - width;
        }
        if x < 0.0 {
            x = 0.0;
        }
        if x + width > container_size.width {
            width = container_size.width - x;
        }
        if y + height > container_size.height {
            y = container_size.height - height;
        }
        if y < 0.0 {
            y = 0.0;
        }
        if y + height > container_size.height {
            height = container_size.height - y;
        }

        for (field, value, current) in [
            ("x", x, el.x_val),
            ("y", y, el.y_val),
            ("width", width, el.display_width()),
            ("height", height, el.display_height()),
        ] {
            if value != current && el.has_property(field) {
                group.add(Command::set_text(id, field, format_number(value)));
            }
        }

        let Some(linked) = el.linked_container_id.and_then(|c| self.container(c)) else {
            return;
        };
        let linked_size = Size::new(width, height);
        for child in &linked.children {
            if let Some(child_el) = self.element(*child) {
                self.check_bounds(*child, child_el.rect(), linked_size, group);
            }
        }
    }

    /// Legal delta for a pointer delta of `dx`/`dy`.
    ///
    /// Moves snap the new position to the grid. Resizes only change the
    /// edges the handle touches; each edge is snapped, then kept at least
    /// the minimum size away from the opposite edge and inside the
    /// container. `grid` of 0 disables snapping.
    pub fn drag_diff(&self, id: ObjectId, dx: f32, dy: f32, gesture: Gesture, grid: f32) -> Offset {
        let Some(el) = self.element(id) else {
            return Offset::ZERO;
        };
        let x1 = el.x_val;
        let y1 = el.y_val;
        let x2 = x1 + el.display_width();
        let y2 = y1 + el.display_height();
        let min_width = el.min_width();
        let min_height = el.min_height();
        let snap = |v: f32| {
            if grid != 0.0 {
                round_to_interval(v, grid)
            } else {
                v
            }
        };
        let lower = |v: f32| {
            if grid != 0.0 {
                round_to_lower_interval(v, grid)
            } else {
                v
            }
        };
        let upper = |v: f32| {
            if grid != 0.0 {
                round_to_upper_interval(v, grid)
            } else {
                v
            }
        };

        let mut diff = Offset::ZERO;
        if gesture == Gesture::Move {
            diff.x = snap(x1 + dx) - x1;
            diff.y = snap(y1 + dy) - y1;
            return diff;
        }

        let container_size = self.container_content_size(id);
        if gesture.touches(Edge::North) {
            let mut drag_y = snap(y1 + dy);
            if drag_y > y2 - min_height {
                drag_y = lower(y2 - min_height).max(0.0);
            } else if drag_y < 0.0 {
                drag_y = 0.0;
            }
            diff.y = drag_y - y1;
        }
        if gesture.touches(Edge::East) {
            let mut drag_x = snap(x2 + dx);
            if drag_x < x1 + min_width {
                drag_x = upper(x1 + min_width);
            } else if drag_x > self.max_width(id) {
                drag_x = self.max_width(id);
            }
            diff.x = drag_x - x2;
        }
        if gesture.touches(Edge::South) {
            let mut drag_y = snap(y2 + dy);
            if drag_y < y1 + min_height {
                drag_y = upper(y1 + min_height);
            } else if drag_y > container_size.height {
                drag_y = container_size.height;
            }
            diff.y = drag_y - y2;
        }
        if gesture.touches(Edge::West) {
            let mut drag_x = snap(x1 + dx);
            if drag_x > x2 - min_width {
                drag_x = lower(x2 - min_width).max(0.0);
            } else if drag_x < 0.0 {
                drag_x = 0.0;
            }
            diff.x = drag_x - x1;
        }
        diff
    }

    /// Rectangle the element would have after applying `dx`/`dy`.
    fn dragged_rect(&self, id: ObjectId, dx: f32, dy: f32, gesture: Gesture) -> Option<Rect> {
        let el = self.element(id)?;
        let mut x1 = el.x_val;
        let mut y1 = el.y_val;
        let mut x2 = x1 + el.display_width();
        let mut y2 = y1 + el.display_height();

        match gesture {
            Gesture::Move => {
                x1 += dx;
                x2 = x1 + el.display_width();
                y1 += dy;
                y2 = y1 + el.display_height();
            }
            Gesture::Resize(handle) => {
                for edge in handle.edges() {
                    match edge {
                        Edge::North => y1 += dy,
                        Edge::East => x2 += dx,
                        Edge::South => y2 += dy,
                        Edge::West => x1 += dx,
                    }
                }
                x1 = x1.max(0.0);
                x2 = x2.max(x1);
                y1 = y1.max(0.0);
                y2 = y2.max(y1);
                x2 = x2.min(self.max_width(id));
                y2 = y2.min(self.container_content_size(id).height);
            }
        }
        Some(Rect::new(x1, y1, x2 - x1, y2 - y1))
    }

    /// Apply a (legal) delta.
    ///
    /// Without a group this is a preview: only a transient display request
    /// is queued. With a group the final rectangle is bounds-checked in the
    /// drop container (the current container when `drop` is `None` or the
    /// same) and the resulting commands are appended, followed by a
    /// container change and a move to the end of the new container's child
    /// list when the element changes container. A drop target that refuses
    /// the element kind, or that lies inside the element's own linked
    /// container, adds nothing.
    ///
    /// Whenever a commit adds no command the element is redrawn at its
    /// committed geometry.
    pub fn update_drag(
        &mut self,
        id: ObjectId,
        dx: f32,
        dy: f32,
        gesture: Gesture,
        drop: Option<ObjectId>,
        group: Option<&mut CommandGroup>,
    ) -> DragOutcome {
        let Some(mut rect) = self.dragged_rect(id, dx, dy, gesture) else {
            log::warn!("update_drag on missing element {id}");
            return DragOutcome::Rejected;
        };
        let Some(group) = group else {
            log::trace!("drag preview {id} {rect:?}");
            self.request_display_rect(id, rect);
            return DragOutcome::Preview(rect);
        };

        let Some(el) = self.element(id) else {
            return DragOutcome::Rejected;
        };
        let kind = el.kind;
        let own = el.linked_container_id;
        let current = el.container_id;
        let target = drop.filter(|d| Some(*d) != current);

        let container_size = match target {
            Some(target) => {
                let allowed = self
                    .container(target)
                    .is_some_and(|c| c.is_element_allowed(kind));
                let inside_itself =
                    own.is_some_and(|own| self.containers().is_descendant(target, own));
                if !allowed || inside_itself {
                    log::debug!("{target} refuses {} {id}", kind.as_str());
                    self.request_display(id);
                    return DragOutcome::Rejected;
                }
                if let Some(current) = current {
                    let relative = self.offset_to(target, current);
                    rect.x -= relative.x;
                    rect.y -= relative.y;
                }
                self.content_size(target)
            }
            None => current.map(|c| self.content_size(c)).unwrap_or(Size::ZERO),
        };

        let before = group.len();
        self.check_bounds(id, rect, container_size, group);
        if let Some(target) = target {
            let position = self.container(target).map_or(0, |c| c.children.len());
            group.add(Command::set_value(
                id,
                "containerId",
                FieldValue::Id(Some(target)),
                ValueKind::Internal,
            ));
            group.add(Command::move_child(id, target, position));
        }
        log::debug!(
            "drag commit {id}: {} command(s), container {:?}",
            group.len() - before,
            target
        );

        if group.is_empty() {
            self.request_display(id);
        }
        DragOutcome::Committed
    }

    /// Deepest container at absolute `x`/`y`, whether or not it accepts
    /// `element`; [`Document::update_drag`] refuses the drop if it does not.
    ///
    /// The element's own linked container and everything nested in it are
    /// never candidates.
    pub fn drop_container_at(&self, x: f32, y: f32, element: ObjectId) -> Option<ObjectId> {
        let el = self.element(element)?;
        let own = el.linked_container_id;
        self.containers()
            .iter()
            .filter(|c| own.is_none_or(|own| !self.containers().is_descendant(c.id, own)))
            .filter(|c| {
                let offset = self.container_offset(c.id);
                let size = self.content_size(c.id);
                Rect::new(offset.x, offset.y, size.width, size.height).contains(x, y)
            })
            .max_by_key(|c| c.level)
            .map(|c| c.id)
    }

    /// Append delete commands for `id` and every element nested in it.
    ///
    /// Nested elements come first, deepest before their owners, so that
    /// reverting the group recreates owners before their children.
    pub fn add_commands_for_delete(&self, id: ObjectId, group: &mut CommandGroup) {
        let mut ids = self.container_children(id);
        ids.reverse();
        ids.push(id);
        for id in ids {
            let Some(el) = self.element(id) else {
                continue;
            };
            let position = el
                .container_id
                .and_then(|c| self.container(c))
                .and_then(|c| c.child_position(id));
            group.add(Command::delete_element(ElementSnapshot::of(el, position)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::BandType;
    use crate::document::linked_container_id_for;
    use crate::kind::ElementKind;
    use crate::model::DocElement;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> ObjectId {
        ObjectId::intern(s)
    }

    fn doc_with(name: &str, kind: ElementKind, rect: Rect) -> Document {
        let mut doc = Document::new();
        doc.add_band(
            id("drag_band"),
            BandType::Content,
            Rect::new(0.0, 0.0, 300.0, 200.0),
        );
        let el = DocElement::new(id(name), kind)
            .with_value("x", FieldValue::Text(format_number(rect.x)))
            .with_value("y", FieldValue::Text(format_number(rect.y)))
            .with_value("width", FieldValue::Text(format_number(rect.width)))
            .with_value("height", FieldValue::Text(format_number(rect.height)));
        doc.add_element(el, Some(id("drag_band")), None).unwrap();
        doc
    }

    #[test]
    fn handle_edges() {
        assert_eq!(Handle::NE.edges().as_slice(), &[Edge::North, Edge::East]);
        assert_eq!(Handle::W.edges().as_slice(), &[Edge::West]);
        assert!(Handle::SW.touches(Edge::South));
        assert!(!Handle::SW.touches(Edge::East));
    }

    #[test]
    fn move_snaps_both_axes() {
        let doc = doc_with("drag_m1", ElementKind::Text, Rect::new(10.0, 10.0, 100.0, 20.0));
        let diff = doc.drag_diff(id("drag_m1"), 14.0, 26.0, Gesture::Move, 10.0);
        assert_eq!(diff, Offset::new(10.0, 30.0));
        let diff = doc.drag_diff(id("drag_m1"), 14.0, 26.0, Gesture::Move, 0.0);
        assert_eq!(diff, Offset::new(14.0, 26.0));
    }

    #[test]
    fn south_east_resize_snaps_edges() {
        let doc = doc_with("drag_se", ElementKind::Text, Rect::new(0.0, 0.0, 100.0, 50.0));
        let diff = doc.drag_diff(id("drag_se"), 47.0, 23.0, Gesture::Resize(Handle::SE), 10.0);
        assert_eq!(diff, Offset::new(50.0, 20.0));
    }

    #[test]
    fn resize_stops_at_min_size() {
        let doc = doc_with("drag_min", ElementKind::Text, Rect::new(15.0, 15.0, 50.0, 50.0));
        let se = doc.drag_diff(id("drag_min"), -200.0, -200.0, Gesture::Resize(Handle::SE), 10.0);
        // right edge >= 15 + 20 rounded up
        assert_eq!(se, Offset::new(40.0 - 65.0, 40.0 - 65.0));
        let nw = doc.drag_diff(id("drag_min"), 200.0, 200.0, Gesture::Resize(Handle::NW), 10.0);
        // left edge <= 65 - 20 rounded down
        assert_eq!(nw, Offset::new(40.0 - 15.0, 40.0 - 15.0));
    }

    #[test]
    fn min_size_clamp_never_leaves_container() {
        // Opposite edges off the grid: 27 - 20 rounds down to 0, not below.
        let doc = doc_with("drag_odd", ElementKind::Text, Rect::new(5.0, 5.0, 22.0, 22.0));
        let nw = doc.drag_diff(id("drag_odd"), 30.0, 30.0, Gesture::Resize(Handle::NW), 10.0);
        assert_eq!(nw, Offset::new(-5.0, -5.0));

        // Smaller than the minimum already.
        let doc = doc_with("drag_small", ElementKind::Text, Rect::new(0.0, 0.0, 10.0, 10.0));
        let nw = doc.drag_diff(id("drag_small"), 5.0, 5.0, Gesture::Resize(Handle::NW), 10.0);
        assert_eq!(nw, Offset::ZERO);
    }

    #[test]
    fn resize_stays_inside_container() {
        let doc = doc_with("drag_out", ElementKind::Text, Rect::new(50.0, 50.0, 100.0, 50.0));
        let nw = doc.drag_diff(id("drag_out"), -500.0, -500.0, Gesture::Resize(Handle::NW), 10.0);
        assert_eq!(nw, Offset::new(-50.0, -50.0));
        let se = doc.drag_diff(id("drag_out"), 500.0, 500.0, Gesture::Resize(Handle::SE), 10.0);
        assert_eq!(se, Offset::new(150.0, 100.0));
    }

    #[test]
    fn untouched_axis_stays_zero() {
        let doc = doc_with("drag_e", ElementKind::Text, Rect::new(0.0, 0.0, 100.0, 50.0));
        let diff = doc.drag_diff(id("drag_e"), 33.0, 40.0, Gesture::Resize(Handle::E), 10.0);
        assert_eq!(diff, Offset::new(30.0, 0.0));
    }

    #[test]
    fn preview_only_requests_display() {
        let mut doc = doc_with("drag_p", ElementKind::Text, Rect::new(0.0, 0.0, 100.0, 20.0));
        doc.take_display_requests();
        let outcome = doc.update_drag(id("drag_p"), 20.0, 10.0, Gesture::Move, None, None);
        assert_eq!(outcome, DragOutcome::Preview(Rect::new(20.0, 10.0, 100.0, 20.0)));
        assert_eq!(
            doc.pending_geometry(id("drag_p")),
            Some(Rect::new(20.0, 10.0, 100.0, 20.0))
        );
        assert_eq!(doc.element(id("drag_p")).unwrap().x_val, 0.0);
    }

    #[test]
    fn commit_emits_changed_fields_only() {
        let mut doc = doc_with("drag_c", ElementKind::Text, Rect::new(0.0, 0.0, 100.0, 50.0));
        let mut group = CommandGroup::new("resize");
        doc.update_drag(
            id("drag_c"),
            50.0,
            20.0,
            Gesture::Resize(Handle::SE),
            None,
            Some(&mut group),
        );
        assert_eq!(group.fields_for(id("drag_c")), vec!["width", "height"]);
    }

    #[test]
    fn check_bounds_moves_before_shrinking() {
        let doc = doc_with("drag_b", ElementKind::Text, Rect::new(0.0, 0.0, 100.0, 20.0));
        let mut group = CommandGroup::new("bounds");
        doc.check_bounds(
            id("drag_b"),
            Rect::new(250.0, -10.0, 100.0, 20.0),
            Size::new(300.0, 200.0),
            &mut group,
        );
        assert_eq!(group.fields_for(id("drag_b")), vec!["x"]);

        let mut group = CommandGroup::new("bounds");
        doc.check_bounds(
            id("drag_b"),
            Rect::new(0.0, 0.0, 400.0, 20.0),
            Size::new(300.0, 200.0),
            &mut group,
        );
        assert_eq!(group.fields_for(id("drag_b")), vec!["width"]);
    }

    #[test]
    fn frame_cannot_be_dropped_inside_itself() {
        let mut doc = doc_with("drag_f", ElementKind::Frame, Rect::new(0.0, 0.0, 200.0, 150.0));
        let own = linked_container_id_for(id("drag_f"));
        doc.add_element(
            DocElement::new(id("drag_f_inner"), ElementKind::Frame),
            Some(own),
            None,
        )
        .unwrap();
        let inner = linked_container_id_for(id("drag_f_inner"));

        for target in [own, inner] {
            let mut group = CommandGroup::new("move");
            let outcome = doc.update_drag(
                id("drag_f"),
                10.0,
                10.0,
                Gesture::Move,
                Some(target),
                Some(&mut group),
            );
            assert_eq!(outcome, DragOutcome::Rejected);
            assert!(group.is_empty());
        }
        assert_eq!(doc.element(id("drag_f")).unwrap().container_id, Some(id("drag_band")));
        assert_eq!(doc.absolute_position(id("drag_f")), Offset::ZERO);
    }

    #[test]
    fn page_break_only_gets_y_commands() {
        let doc = doc_with("drag_pb", ElementKind::PageBreak, Rect::new(0.0, 0.0, 100.0, 1.0));
        let mut group = CommandGroup::new("bounds");
        doc.check_bounds(
            id("drag_pb"),
            Rect::new(-20.0, 250.0, 100.0, 1.0),
            Size::new(300.0, 200.0),
            &mut group,
        );
        assert_eq!(group.fields_for(id("drag_pb")), vec!["y"]);
    }
}
