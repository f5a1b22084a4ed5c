//! Selected elements.

use rl_core::{Document, ObjectId};

#[derive(Debug, Default)]
pub struct Selection {
    /// Currently selected element(s), in selection order.
    selected: Vec<ObjectId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.selected.contains(&id)
    }

    pub fn selected(&self) -> &[ObjectId] {
        &self.selected
    }

    pub fn first_selected(&self) -> Option<ObjectId> {
        self.selected.first().copied()
    }

    /// Select `id`, replacing the selection when `clear_previous` is set.
    ///
    /// Adding to the selection is refused when an element nested in `id`, or
    /// an element `id` is nested in, is already selected. Returns whether
    /// `id` is selected afterwards.
    pub fn select(&mut self, doc: &Document, id: ObjectId, clear_previous: bool) -> bool {
        if doc.element(id).is_none() {
            return false;
        }
        if clear_previous {
            self.selected.clear();
        } else if self.is_selected(id) {
            return true;
        } else if self.conflicts(doc, id) {
            log::debug!("selection: {id} overlaps a selected parent or child");
            return false;
        }
        self.selected.push(id);
        true
    }

    pub fn deselect(&mut self, id: ObjectId) {
        self.selected.retain(|s| *s != id);
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    /// Drop ids that no longer exist in `doc`.
    pub fn retain_existing(&mut self, doc: &Document) {
        self.selected.retain(|id| doc.element(*id).is_some());
    }

    fn conflicts(&self, doc: &Document, id: ObjectId) -> bool {
        let nested = doc.container_children(id);
        self.selected.iter().any(|selected| {
            nested.contains(selected) || doc.container_children(*selected).contains(&id)
        })
    }
}
