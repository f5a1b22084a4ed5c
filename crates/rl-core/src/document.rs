//! The document arena.
//!
//! Elements, containers and parameters live in maps keyed by [`ObjectId`].
//! An element knows its container by id, a container knows its children as
//! an ordered id list, and a linked container knows its owning element by
//! id. Nothing holds a live reference to anything else.
//!
//! Raw field assignment ([`Document::set_value`]) is crate-private: outside
//! code mutates a document only through [`crate::command::Command`]s so that
//! every change can be undone.

use crate::config::PageSettings;
use crate::container::{BandType, Container, ContainerTree};
use crate::error::DocumentError;
use crate::id::ObjectId;
use crate::kind::ElementKind;
use crate::model::{DocElement, FieldEffect, FieldValue, ValidationError};
use crate::parameter::ParameterSet;
use crate::units::{Offset, Rect, Size, format_number};
use std::collections::HashMap;

/// Something the renderer has to redraw.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayRequest {
    /// Place the element at `rect` (document units, container relative).
    Geometry { id: ObjectId, rect: Rect },
    /// Re-apply the element's style.
    Style { id: ObjectId },
}

/// An element taken out of the document, with where it was.
#[derive(Debug, Clone)]
pub(crate) struct RemovedElement {
    pub element: DocElement,
    pub position: Option<usize>,
}

#[derive(Debug, Default)]
pub struct Document {
    elements: HashMap<ObjectId, DocElement>,
    containers: ContainerTree,
    parameters: ParameterSet,
    /// Pending display updates, drained by the renderer.
    display: Vec<DisplayRequest>,
}

impl Document {
    /// Empty document without bands.
    pub fn new() -> Self {
        Self::default()
    }

    /// Document with the standard header, content and footer bands laid
    /// out for `page`. Band ids are `header`, `content` and `footer`.
    pub fn from_page(page: &PageSettings) -> Self {
        let mut doc = Self::new();
        let width = page.content_width();
        let mut y = page.margin_top;
        if page.header {
            doc.add_band(
                ObjectId::intern("header"),
                BandType::Header,
                Rect::new(page.margin_left, y, width, page.header_height),
            );
            y += page.header_height;
        }
        let content_height = page.content_height();
        doc.add_band(
            ObjectId::intern("content"),
            BandType::Content,
            Rect::new(page.margin_left, y, width, content_height),
        );
        y += content_height;
        if page.footer {
            doc.add_band(
                ObjectId::intern("footer"),
                BandType::Footer,
                Rect::new(page.margin_left, y, width, page.footer_height),
            );
        }
        doc
    }

    /// Add a top-level band at an absolute position.
    pub fn add_band(&mut self, id: ObjectId, band_type: BandType, rect: Rect) -> ObjectId {
        self.containers
            .insert(Container::band(id, band_type, rect), None);
        id
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn element(&self, id: ObjectId) -> Option<&DocElement> {
        self.elements.get(&id)
    }

    pub fn elements(&self) -> impl Iterator<Item = &DocElement> {
        self.elements.values()
    }

    pub fn element_ids(&self) -> Vec<ObjectId> {
        self.elements.keys().copied().collect()
    }

    pub fn container(&self, id: ObjectId) -> Option<&Container> {
        self.containers.get(id)
    }

    pub fn containers(&self) -> &ContainerTree {
        &self.containers
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    pub fn set_parameters(&mut self, parameters: ParameterSet) {
        self.parameters = parameters;
    }

    pub(crate) fn parameters_mut(&mut self) -> &mut ParameterSet {
        &mut self.parameters
    }

    /// Element whose linked container hosts `id`.
    pub fn parent_element(&self, id: ObjectId) -> Option<ObjectId> {
        let container = self.element(id)?.container_id?;
        self.container(container)?.owner
    }

    /// Every element nested below `id` through linked containers, each
    /// followed by its own nested elements.
    pub fn container_children(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        self.append_container_children(id, &mut out);
        out
    }

    fn append_container_children(&self, id: ObjectId, out: &mut Vec<ObjectId>) {
        let Some(linked) = self.element(id).and_then(|e| e.linked_container_id) else {
            return;
        };
        let Some(container) = self.container(linked) else {
            return;
        };
        for child in &container.children {
            out.push(*child);
            self.append_container_children(*child, out);
        }
    }

    // ─── Validation diagnostics ──────────────────────────────────────────

    pub fn add_error(&mut self, id: ObjectId, error: ValidationError) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.add_error(error);
        }
    }

    pub fn clear_errors(&mut self, id: ObjectId) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.clear_errors();
        }
    }

    // ─── Container geometry ──────────────────────────────────────────────

    /// Inner size of a container. Linked containers take the size of the
    /// element they belong to.
    pub fn content_size(&self, container: ObjectId) -> Size {
        let Some(c) = self.container(container) else {
            return Size::ZERO;
        };
        match c.owner.and_then(|owner| self.element(owner)) {
            Some(owner) => Size::new(owner.display_width(), owner.display_height()),
            None => c.band_rect.size(),
        }
    }

    /// Absolute offset of a container's content origin.
    pub fn container_offset(&self, container: ObjectId) -> Offset {
        let Some(c) = self.container(container) else {
            return Offset::ZERO;
        };
        match c.owner.and_then(|owner| self.element(owner)) {
            Some(owner) => {
                let base = owner
                    .container_id
                    .map(|parent| self.container_offset(parent))
                    .unwrap_or(Offset::ZERO);
                Offset::new(base.x + owner.x_val, base.y + owner.y_val)
            }
            None => Offset::new(c.band_rect.x, c.band_rect.y),
        }
    }

    /// Offset of `container` relative to `other`.
    pub fn offset_to(&self, container: ObjectId, other: ObjectId) -> Offset {
        let a = self.container_offset(container);
        let b = self.container_offset(other);
        Offset::new(a.x - b.x, a.y - b.y)
    }

    /// Content size of the container an element is placed in.
    pub fn container_content_size(&self, id: ObjectId) -> Size {
        self.element(id)
            .and_then(|e| e.container_id)
            .map(|c| self.content_size(c))
            .unwrap_or(Size::ZERO)
    }

    /// Absolute position of an element inside the document.
    pub fn absolute_position(&self, id: ObjectId) -> Offset {
        let Some(el) = self.element(id) else {
            return Offset::ZERO;
        };
        let base = el
            .container_id
            .map(|c| self.container_offset(c))
            .unwrap_or(Offset::ZERO);
        Offset::new(base.x + el.x_val, base.y + el.y_val)
    }

    /// Largest right edge an element may be resized to.
    pub fn max_width(&self, id: ObjectId) -> f32 {
        self.container_content_size(id).width
    }

    /// Recompute the nesting level of every container.
    pub fn init_levels(&mut self) {
        self.containers.init_levels();
    }

    // ─── Element lifecycle ───────────────────────────────────────────────

    /// Place `element` into `container` at `position` (appended when
    /// `None`). Kinds that host a nested container get it created here.
    pub fn add_element(
        &mut self,
        mut element: DocElement,
        container: Option<ObjectId>,
        position: Option<usize>,
    ) -> Result<ObjectId, DocumentError> {
        let id = element.id;
        if self.elements.contains_key(&id) {
            return Err(DocumentError::DuplicateId(id.to_string()));
        }
        if let Some(c) = container {
            if !self.containers.contains(c) {
                return Err(DocumentError::UnknownContainer(c.to_string()));
            }
        }
        element.container_id = container;

        if let Some(kind) = element.kind.capabilities().linked_container {
            let linked = *element
                .linked_container_id
                .get_or_insert_with(|| linked_container_id_for(id));
            if !self.containers.contains(linked) {
                self.containers
                    .insert(Container::linked(linked, kind, id), container);
            } else {
                self.containers.set_parent(linked, container);
            }
        }

        if let Some(c) = container.and_then(|c| self.containers.get_mut(c)) {
            match position {
                Some(pos) => c.place(id, pos),
                None => c.attach(id),
            }
        }
        self.elements.insert(id, element);
        self.containers.init_levels();
        self.request_display(id);
        Ok(id)
    }

    /// Create an element of `kind` at `x`/`y` inside `container`, with the
    /// kind's default size, and clamp it into the container.
    pub fn create_element(
        &mut self,
        kind: ElementKind,
        container: ObjectId,
        x: f32,
        y: f32,
    ) -> Result<ObjectId, DocumentError> {
        let element = DocElement::new(ObjectId::with_prefix(kind.as_str()), kind)
            .with_value("x", FieldValue::Text(format_number(x)))
            .with_value("y", FieldValue::Text(format_number(y)));
        let id = self.add_element(element, Some(container), None)?;
        self.setup(id);
        Ok(id)
    }

    /// One-time fix-up after creation: move the element back inside its
    /// container if it was created outside of it.
    pub fn setup(&mut self, id: ObjectId) {
        let Some(container) = self.element(id).and_then(|e| e.container_id) else {
            return;
        };
        let size = self.content_size(container);
        let Some(el) = self.elements.get_mut(&id) else {
            return;
        };
        if el.x_val + el.width_val > size.width {
            el.x_val = size.width - el.width_val;
        }
        if el.x_val < 0.0 {
            el.x_val = 0.0;
        }
        if el.y_val + el.height_val > size.height {
            el.y_val = size.height - el.height_val;
        }
        if el.y_val < 0.0 {
            el.y_val = 0.0;
        }
        el.x = format_number(el.x_val);
        el.y = format_number(el.y_val);
        self.request_display(id);
    }

    /// Take an element out of the document together with its linked
    /// container. Nested elements must have been removed before.
    pub(crate) fn remove_element(&mut self, id: ObjectId) -> Option<RemovedElement> {
        let element = self.elements.remove(&id)?;
        let position = element
            .container_id
            .and_then(|c| self.containers.get_mut(c))
            .and_then(|c| c.detach(id));
        if let Some(linked) = element.linked_container_id {
            if let Some(container) = self.containers.remove(linked) {
                if !container.children.is_empty() {
                    log::warn!(
                        "removing {id} while its container still hosts {} element(s)",
                        container.children.len()
                    );
                    for orphan in container.children {
                        self.remove_element(orphan);
                    }
                }
            }
        }
        self.containers.init_levels();
        Some(RemovedElement { element, position })
    }

    // ─── Raw mutation ────────────────────────────────────────────────────

    /// Assign a field and run its side effects. Bypasses undo; only
    /// commands call this.
    pub(crate) fn set_value(&mut self, id: ObjectId, field: &str, value: FieldValue) {
        let Some(el) = self.elements.get_mut(&id) else {
            log::warn!("set_value({field}) on missing element {id}");
            return;
        };
        match el.set_field(field, value) {
            FieldEffect::None => {}
            FieldEffect::Geometry => self.request_display(id),
            FieldEffect::Container { old } => {
                let new = el.container_id;
                let linked = el.linked_container_id;
                if let Some(c) = old.and_then(|c| self.containers.get_mut(c)) {
                    c.detach(id);
                }
                if let Some(c) = new.and_then(|c| self.containers.get_mut(c)) {
                    c.attach(id);
                }
                if let Some(linked) = linked {
                    self.containers.set_parent(linked, new);
                }
                // Nesting depth of every container below this one may change.
                self.containers.init_levels();
                self.request_display(id);
            }
            FieldEffect::Style { geometry } => {
                self.display.push(DisplayRequest::Style { id });
                if geometry {
                    self.request_display(id);
                }
            }
        }
    }

    /// Put `id` at `position` in `container`'s child order, taking it out of
    /// any other container's list. Returns where it was before.
    pub(crate) fn move_child(
        &mut self,
        id: ObjectId,
        container: ObjectId,
        position: usize,
    ) -> Option<(ObjectId, usize)> {
        let previous = self
            .containers
            .iter()
            .find_map(|c| c.child_position(id).map(|pos| (c.id, pos)));
        if let Some((old, _)) = previous {
            if old != container {
                if let Some(c) = self.containers.get_mut(old) {
                    c.detach(id);
                }
            }
        }
        match self.containers.get_mut(container) {
            Some(c) => c.place(id, position),
            None => log::warn!("move_child into missing container {container}"),
        }
        previous
    }

    /// Drop `id` from `container`'s child list.
    pub(crate) fn detach_child(&mut self, id: ObjectId, container: ObjectId) {
        if let Some(c) = self.containers.get_mut(container) {
            c.detach(id);
        }
    }

    // ─── Display ─────────────────────────────────────────────────────────

    /// Ask the renderer to draw the element at its committed geometry.
    pub fn request_display(&mut self, id: ObjectId) {
        if let Some(el) = self.elements.get(&id) {
            let rect = el.rect();
            self.display.push(DisplayRequest::Geometry { id, rect });
        }
    }

    /// Transient display of an uncommitted rectangle (drag preview).
    pub(crate) fn request_display_rect(&mut self, id: ObjectId, rect: Rect) {
        self.display.push(DisplayRequest::Geometry { id, rect });
    }

    /// Drain pending display requests.
    pub fn take_display_requests(&mut self) -> Vec<DisplayRequest> {
        std::mem::take(&mut self.display)
    }

    /// Last geometry requested for `id`, if any is pending.
    pub fn pending_geometry(&self, id: ObjectId) -> Option<Rect> {
        self.display.iter().rev().find_map(|r| match r {
            DisplayRequest::Geometry { id: rid, rect } if *rid == id => Some(*rect),
            _ => None,
        })
    }
}

/// Id of the container hosted by element `id`.
pub fn linked_container_id_for(id: ObjectId) -> ObjectId {
    ObjectId::intern(&format!("{}_content", id.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerKind;

    fn id(s: &str) -> ObjectId {
        ObjectId::intern(s)
    }

    fn doc() -> Document {
        let mut doc = Document::new();
        doc.add_band(
            id("band"),
            BandType::Content,
            Rect::new(20.0, 100.0, 300.0, 200.0),
        );
        doc
    }

    fn text(name: &str, x: f32, y: f32) -> DocElement {
        DocElement::new(id(name), ElementKind::Text)
            .with_value("x", FieldValue::Text(format_number(x)))
            .with_value("y", FieldValue::Text(format_number(y)))
    }

    #[test]
    fn page_bands_stack_vertically() {
        let doc = Document::from_page(&PageSettings::default());
        assert_eq!(doc.container_offset(id("header")), Offset::new(20.0, 20.0));
        assert_eq!(doc.container_offset(id("content")), Offset::new(20.0, 100.0));
        assert_eq!(doc.content_size(id("content")), Size::new(555.0, 642.0));
        assert_eq!(doc.container_offset(id("footer")), Offset::new(20.0, 742.0));
    }

    #[test]
    fn frame_gets_linked_container() {
        let mut doc = doc();
        let frame = DocElement::new(id("doc_frame"), ElementKind::Frame)
            .with_value("x", FieldValue::text("30"))
            .with_value("y", FieldValue::text("40"));
        doc.add_element(frame, Some(id("band")), None).unwrap();

        let linked = doc.element(id("doc_frame")).unwrap().linked_container_id.unwrap();
        let container = doc.container(linked).unwrap();
        assert_eq!(container.kind, ContainerKind::Frame);
        assert_eq!(container.owner, Some(id("doc_frame")));
        assert_eq!(container.level, 1);
        assert_eq!(doc.content_size(linked), Size::new(100.0, 100.0));
        assert_eq!(doc.container_offset(linked), Offset::new(50.0, 140.0));
        assert_eq!(doc.offset_to(linked, id("band")), Offset::new(30.0, 40.0));
    }

    #[test]
    fn setup_clamps_into_container() {
        let mut doc = doc();
        doc.add_element(text("doc_far", 290.0, 195.0), Some(id("band")), None)
            .unwrap();
        doc.setup(id("doc_far"));
        let el = doc.element(id("doc_far")).unwrap();
        assert_eq!((el.x.as_str(), el.y.as_str()), ("200", "180"));
        assert_eq!(el.rect(), Rect::new(200.0, 180.0, 100.0, 20.0));
    }

    #[test]
    fn create_element_places_and_clamps() {
        let mut doc = doc();
        let created = doc
            .create_element(ElementKind::Image, id("band"), -5.0, 150.0)
            .unwrap();
        let el = doc.element(created).unwrap();
        assert_eq!(el.rect(), Rect::new(0.0, 120.0, 80.0, 80.0));
        assert_eq!(doc.container(id("band")).unwrap().children, vec![created]);
    }

    #[test]
    fn add_rejects_unknown_container_and_duplicates() {
        let mut doc = doc();
        assert!(matches!(
            doc.add_element(text("doc_a", 0.0, 0.0), Some(id("nowhere")), None),
            Err(DocumentError::UnknownContainer(_))
        ));
        doc.add_element(text("doc_b", 0.0, 0.0), Some(id("band")), None)
            .unwrap();
        assert!(matches!(
            doc.add_element(text("doc_b", 0.0, 0.0), Some(id("band")), None),
            Err(DocumentError::DuplicateId(_))
        ));
    }

    #[test]
    fn container_id_change_moves_child_and_relevels() {
        let mut doc = doc();
        doc.add_band(id("band2"), BandType::Footer, Rect::new(0.0, 0.0, 300.0, 50.0));
        let frame = DocElement::new(id("doc_mover"), ElementKind::Frame);
        doc.add_element(frame, Some(id("band")), None).unwrap();
        let inner = DocElement::new(id("doc_inner_frame"), ElementKind::Frame);
        let linked = linked_container_id_for(id("doc_mover"));
        doc.add_element(inner, Some(linked), None).unwrap();
        let inner_linked = linked_container_id_for(id("doc_inner_frame"));
        assert_eq!(doc.container(inner_linked).unwrap().level, 2);

        doc.set_value(
            id("doc_inner_frame"),
            "containerId",
            FieldValue::Id(Some(id("band2"))),
        );
        assert!(doc.container(linked).unwrap().children.is_empty());
        assert_eq!(
            doc.container(id("band2")).unwrap().children,
            vec![id("doc_inner_frame")]
        );
        assert_eq!(doc.containers().parent(inner_linked), Some(id("band2")));
        assert_eq!(doc.container(inner_linked).unwrap().level, 1);
    }

    #[test]
    fn style_change_requests_style_refresh() {
        let mut doc = doc();
        doc.add_element(text("doc_styled", 0.0, 0.0), Some(id("band")), None)
            .unwrap();
        doc.take_display_requests();
        doc.set_value(id("doc_styled"), "bold", FieldValue::Bool(true));
        assert_eq!(
            doc.take_display_requests(),
            vec![DisplayRequest::Style {
                id: id("doc_styled")
            }]
        );
        doc.set_value(id("doc_styled"), "borderWidth", FieldValue::text("2"));
        assert_eq!(doc.take_display_requests().len(), 2);
    }

    #[test]
    fn nested_children_are_listed_depth_first() {
        let mut doc = doc();
        doc.add_element(
            DocElement::new(id("doc_outer"), ElementKind::Frame),
            Some(id("band")),
            None,
        )
        .unwrap();
        let outer = linked_container_id_for(id("doc_outer"));
        doc.add_element(
            DocElement::new(id("doc_mid"), ElementKind::Frame),
            Some(outer),
            None,
        )
        .unwrap();
        let mid = linked_container_id_for(id("doc_mid"));
        doc.add_element(text("doc_leaf", 0.0, 0.0), Some(mid), None)
            .unwrap();
        doc.add_element(text("doc_sibling", 0.0, 0.0), Some(outer), None)
            .unwrap();

        assert_eq!(
            doc.container_children(id("doc_outer")),
            vec![id("doc_mid"), id("doc_leaf"), id("doc_sibling")]
        );
        assert_eq!(doc.parent_element(id("doc_leaf")), Some(id("doc_mid")));
        assert_eq!(
            doc.absolute_position(id("doc_leaf")),
            Offset::new(20.0, 100.0)
        );
    }
}
