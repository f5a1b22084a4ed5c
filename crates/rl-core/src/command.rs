//! Reversible document mutations.
//!
//! A [`Command`] changes one thing in a [`Document`] and remembers enough to
//! put it back. Previous values are captured the first time a command is
//! applied, so a command can be built long before it runs. A
//! [`CommandGroup`] bundles the commands of one gesture into a single undo
//! step.
//!
//! Applying an already applied command (or reverting a reverted one) leaves
//! the document unchanged.

use crate::document::Document;
use crate::id::ObjectId;
use crate::model::{DocElement, FieldValue};
use serde_json::{Map, Value};

/// How a `SetValue` payload is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Plain text or numeric text.
    Text,
    Checkbox,
    /// Structured rich-text document.
    RichText,
    /// Structural field not shown in the property panel (`containerId`).
    Internal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetValue {
    pub id: ObjectId,
    pub field: String,
    pub value: FieldValue,
    pub kind: ValueKind,
    /// Value before the first application.
    previous: Option<FieldValue>,
    /// Child slot in the old container, for `containerId` changes.
    previous_position: Option<usize>,
}

/// Move an element to a position in a container's child order.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveChild {
    pub id: ObjectId,
    pub container: ObjectId,
    pub position: usize,
    previous: Option<(ObjectId, usize)>,
}

/// Everything needed to recreate an element where it was.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSnapshot {
    pub id: ObjectId,
    /// Serialized element, as produced by `DocElement::to_js`.
    pub data: Map<String, Value>,
    pub container_id: Option<ObjectId>,
    /// Position among the container's children.
    pub position: Option<usize>,
}

impl ElementSnapshot {
    pub fn of(element: &DocElement, position: Option<usize>) -> Self {
        Self {
            id: element.id,
            data: element.to_js(),
            container_id: element.container_id,
            position,
        }
    }
}

/// Insert (`add == true`) or delete an element.
#[derive(Debug, Clone, PartialEq)]
pub struct AddDelete {
    pub add: bool,
    pub snapshot: ElementSnapshot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenameParameter {
    pub id: ObjectId,
    pub name: String,
    previous: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetValue(SetValue),
    MoveChild(MoveChild),
    AddDelete(AddDelete),
    RenameParameter(RenameParameter),
}

impl Command {
    pub fn set_value(
        id: ObjectId,
        field: impl Into<String>,
        value: FieldValue,
        kind: ValueKind,
    ) -> Self {
        Command::SetValue(SetValue {
            id,
            field: field.into(),
            value,
            kind,
            previous: None,
            previous_position: None,
        })
    }

    /// Shorthand for a text field.
    pub fn set_text(id: ObjectId, field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::set_value(id, field, FieldValue::Text(value.into()), ValueKind::Text)
    }

    pub fn move_child(id: ObjectId, container: ObjectId, position: usize) -> Self {
        Command::MoveChild(MoveChild {
            id,
            container,
            position,
            previous: None,
        })
    }

    pub fn add_element(snapshot: ElementSnapshot) -> Self {
        Command::AddDelete(AddDelete {
            add: true,
            snapshot,
        })
    }

    pub fn delete_element(snapshot: ElementSnapshot) -> Self {
        Command::AddDelete(AddDelete {
            add: false,
            snapshot,
        })
    }

    pub fn rename_parameter(id: ObjectId, name: impl Into<String>) -> Self {
        Command::RenameParameter(RenameParameter {
            id,
            name: name.into(),
            previous: None,
        })
    }

    /// Object the command targets.
    pub fn target(&self) -> ObjectId {
        match self {
            Command::SetValue(c) => c.id,
            Command::MoveChild(c) => c.id,
            Command::AddDelete(c) => c.snapshot.id,
            Command::RenameParameter(c) => c.id,
        }
    }

    /// Field name for `SetValue` commands.
    pub fn field(&self) -> Option<&str> {
        match self {
            Command::SetValue(c) => Some(&c.field),
            _ => None,
        }
    }

    pub fn apply(&mut self, doc: &mut Document) {
        match self {
            Command::SetValue(c) => {
                let Some(el) = doc.element(c.id) else {
                    log::warn!("SetValue({}) on missing element {}", c.field, c.id);
                    return;
                };
                if c.previous.is_none() {
                    let current = el
                        .get_value(&c.field)
                        .unwrap_or_else(|| FieldValue::default_for(&c.field));
                    if c.field == "containerId" {
                        c.previous_position = el
                            .container_id
                            .and_then(|old| doc.container(old))
                            .and_then(|old| old.child_position(c.id));
                    }
                    c.previous = Some(current);
                }
                doc.set_value(c.id, &c.field, c.value.clone());
            }
            Command::MoveChild(c) => {
                let previous = doc.move_child(c.id, c.container, c.position);
                if c.previous.is_none() {
                    c.previous = previous;
                }
            }
            Command::AddDelete(c) => {
                if c.add {
                    restore(doc, &c.snapshot);
                } else {
                    remove(doc, &mut c.snapshot);
                }
            }
            Command::RenameParameter(c) => {
                let previous = doc.parameters_mut().rename(c.id, &c.name);
                if c.previous.is_none() {
                    c.previous = previous;
                }
            }
        }
    }

    pub fn revert(&mut self, doc: &mut Document) {
        match self {
            Command::SetValue(c) => {
                let Some(previous) = c.previous.clone() else {
                    return;
                };
                let old_container = previous.as_id();
                doc.set_value(c.id, &c.field, previous);
                if let (Some(container), Some(position)) = (old_container, c.previous_position) {
                    doc.move_child(c.id, container, position);
                }
            }
            Command::MoveChild(c) => match c.previous {
                Some((container, position)) => {
                    doc.move_child(c.id, container, position);
                }
                None => doc.detach_child(c.id, c.container),
            },
            Command::AddDelete(c) => {
                if c.add {
                    remove(doc, &mut c.snapshot);
                } else {
                    restore(doc, &c.snapshot);
                }
            }
            Command::RenameParameter(c) => {
                if let Some(previous) = c.previous.clone() {
                    doc.parameters_mut().rename(c.id, &previous);
                }
            }
        }
    }
}

/// Take the element out, refreshing the snapshot with its current state.
fn remove(doc: &mut Document, snapshot: &mut ElementSnapshot) {
    if let Some(removed) = doc.remove_element(snapshot.id) {
        *snapshot = ElementSnapshot::of(&removed.element, removed.position);
    }
}

/// Recreate the element from the snapshot unless it already exists.
fn restore(doc: &mut Document, snapshot: &ElementSnapshot) {
    if doc.element(snapshot.id).is_some() {
        return;
    }
    match DocElement::from_js(&snapshot.data) {
        Ok(element) => {
            if let Err(err) = doc.add_element(element, snapshot.container_id, snapshot.position) {
                log::warn!("cannot restore {}: {err}", snapshot.id);
            }
        }
        Err(err) => log::warn!("cannot restore {}: {err}", snapshot.id),
    }
}

/// Commands applied and reverted as one undo step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandGroup {
    pub description: String,
    commands: Vec<Command>,
}

impl CommandGroup {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            commands: Vec::new(),
        }
    }

    pub fn add(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Fields changed on `id` by `SetValue` commands, in order.
    pub fn fields_for(&self, id: ObjectId) -> Vec<&str> {
        self.commands
            .iter()
            .filter(|c| c.target() == id)
            .filter_map(Command::field)
            .collect()
    }

    /// Apply every command in order.
    pub fn apply(&mut self, doc: &mut Document) {
        for command in &mut self.commands {
            command.apply(doc);
        }
    }

    /// Revert every command in reverse order.
    pub fn revert(&mut self, doc: &mut Document) {
        for command in self.commands.iter_mut().rev() {
            command.revert(doc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::BandType;
    use crate::kind::ElementKind;
    use crate::units::Rect;

    fn id(s: &str) -> ObjectId {
        ObjectId::intern(s)
    }

    fn doc_with_text(name: &str) -> Document {
        let mut doc = Document::new();
        doc.add_band(id("cmd_band"), BandType::Content, Rect::new(0.0, 0.0, 400.0, 300.0));
        doc.add_band(id("cmd_band2"), BandType::Footer, Rect::new(0.0, 300.0, 400.0, 100.0));
        let el = DocElement::new(id(name), ElementKind::Text)
            .with_value("content", FieldValue::text("Hello"));
        doc.add_element(el, Some(id("cmd_band")), None).unwrap();
        doc
    }

    #[test]
    fn set_value_roundtrip() {
        let mut doc = doc_with_text("cmd_t1");
        let mut cmd = Command::set_text(id("cmd_t1"), "width", "150");
        cmd.apply(&mut doc);
        assert_eq!(doc.element(id("cmd_t1")).unwrap().width_val, 150.0);
        cmd.revert(&mut doc);
        let el = doc.element(id("cmd_t1")).unwrap();
        assert_eq!(el.width, "100");
        assert_eq!(el.width_val, 100.0);
    }

    #[test]
    fn reapply_keeps_original_previous_value() {
        let mut doc = doc_with_text("cmd_t2");
        let mut cmd = Command::set_text(id("cmd_t2"), "content", "Bye");
        cmd.apply(&mut doc);
        cmd.apply(&mut doc);
        assert_eq!(doc.element(id("cmd_t2")).unwrap().text_value("content"), "Bye");
        cmd.revert(&mut doc);
        assert_eq!(
            doc.element(id("cmd_t2")).unwrap().text_value("content"),
            "Hello"
        );
    }

    #[test]
    fn group_reverts_in_reverse_order() {
        let mut doc = doc_with_text("cmd_t3");
        let mut group = CommandGroup::new("edit");
        group.add(Command::set_text(id("cmd_t3"), "content", "A"));
        group.add(Command::set_text(id("cmd_t3"), "content", "B"));
        group.apply(&mut doc);
        assert_eq!(doc.element(id("cmd_t3")).unwrap().text_value("content"), "B");
        group.revert(&mut doc);
        assert_eq!(
            doc.element(id("cmd_t3")).unwrap().text_value("content"),
            "Hello"
        );
    }

    #[test]
    fn empty_group() {
        let mut doc = doc_with_text("cmd_t4");
        let mut group = CommandGroup::new("noop");
        assert!(group.is_empty());
        group.apply(&mut doc);
        group.revert(&mut doc);
        assert_eq!(group.len(), 0);
    }

    #[test]
    fn container_change_and_reorder_revert_to_original_slot() {
        let mut doc = doc_with_text("cmd_t5");
        let other = DocElement::new(id("cmd_t5_other"), ElementKind::Text);
        doc.add_element(other, Some(id("cmd_band")), None).unwrap();

        let mut group = CommandGroup::new("move");
        group.add(Command::set_value(
            id("cmd_t5"),
            "containerId",
            FieldValue::Id(Some(id("cmd_band2"))),
            ValueKind::Internal,
        ));
        group.add(Command::move_child(id("cmd_t5"), id("cmd_band2"), 0));
        group.apply(&mut doc);
        assert_eq!(
            doc.container(id("cmd_band2")).unwrap().children,
            vec![id("cmd_t5")]
        );
        assert_eq!(
            doc.container(id("cmd_band")).unwrap().children,
            vec![id("cmd_t5_other")]
        );

        group.revert(&mut doc);
        assert_eq!(
            doc.container(id("cmd_band")).unwrap().children,
            vec![id("cmd_t5"), id("cmd_t5_other")]
        );
        assert!(doc.container(id("cmd_band2")).unwrap().children.is_empty());
        assert_eq!(
            doc.element(id("cmd_t5")).unwrap().container_id,
            Some(id("cmd_band"))
        );
    }

    #[test]
    fn delete_and_restore() {
        let mut doc = doc_with_text("cmd_t6");
        let el = doc.element(id("cmd_t6")).unwrap();
        let mut cmd = Command::delete_element(ElementSnapshot::of(el, Some(0)));
        cmd.apply(&mut doc);
        assert!(doc.element(id("cmd_t6")).is_none());
        cmd.apply(&mut doc);
        cmd.revert(&mut doc);
        let restored = doc.element(id("cmd_t6")).unwrap();
        assert_eq!(restored.text_value("content"), "Hello");
        assert_eq!(
            doc.container(id("cmd_band")).unwrap().children,
            vec![id("cmd_t6")]
        );
    }

    #[test]
    fn missing_target_is_a_noop() {
        let mut doc = doc_with_text("cmd_t7");
        let mut cmd = Command::set_text(id("cmd_nobody"), "x", "5");
        cmd.apply(&mut doc);
        cmd.revert(&mut doc);
        assert!(doc.element(id("cmd_nobody")).is_none());
    }
}
