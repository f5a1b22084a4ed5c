//! Rewriting `${...}` references when a parameter is renamed.
//!
//! Whether a reference in a field points at the renamed parameter depends on
//! the data sources visible from the element: a table or section iterating
//! over an array parameter makes that array's row parameters addressable by
//! their bare name. Visibility is approximated the same way everywhere: a
//! bare `${name}` is taken to mean a row parameter whenever any visible data
//! source has a row parameter of that name.

use crate::command::{Command, CommandGroup, ValueKind};
use crate::document::Document;
use crate::id::ObjectId;
use crate::kind::ElementKind;
use crate::model::FieldValue;
use crate::parameter::ParameterType;
use smallvec::SmallVec;

/// An array parameter iterated by an enclosing table or section.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSource {
    pub name: String,
    /// Row parameters of the array.
    pub parameters: Vec<ObjectId>,
}

impl Document {
    /// Data source names of the tables and sections enclosing `id`,
    /// innermost first.
    ///
    /// A table or section only contributes when reached from one of its
    /// content bands.
    pub fn all_data_source_parameter_names(&self, id: ObjectId) -> SmallVec<[String; 4]> {
        let mut names = SmallVec::new();
        let mut child = id;
        while let Some(parent) = self.parent_element(child) {
            if let Some(el) = self.element(parent) {
                let from_content_band = self
                    .element(child)
                    .is_some_and(|c| c.text_value("bandType") == "content");
                if matches!(el.kind, ElementKind::Table | ElementKind::Section) && from_content_band
                {
                    if let Some(name) = el.data_source_parameter_name() {
                        names.push(name);
                    }
                }
            }
            child = parent;
        }
        names
    }

    /// Array data sources visible from `id`, innermost first.
    ///
    /// Names are resolved from the outermost scope inwards: a name is first
    /// looked up among the row parameters of the data sources resolved so
    /// far, and otherwise as a root parameter.
    pub fn all_data_sources(&self, id: ObjectId) -> Vec<DataSource> {
        let params = self.parameters();
        let mut sources: Vec<DataSource> = Vec::new();
        for name in self.all_data_source_parameter_names(id).iter().rev() {
            let nested = sources
                .iter()
                .flat_map(|s| s.parameters.iter())
                .filter_map(|p| params.get(*p))
                .find(|p| p.name == *name);
            let Some(param) = nested.or_else(|| params.by_name(name)) else {
                continue;
            };
            if param.ty == ParameterType::Array {
                sources.insert(
                    0,
                    DataSource {
                        name: name.clone(),
                        parameters: param.children.clone(),
                    },
                );
            }
        }
        sources
    }

    /// Reference text to look for and its replacement when `param` is
    /// renamed to `new_name`, as seen from element `id`.
    fn parameter_references(
        &self,
        id: ObjectId,
        param: ObjectId,
        new_name: &str,
    ) -> Option<(String, String)> {
        let params = self.parameters();
        let parameter = params.get(param)?;
        let parent = params.parent_of(param);
        let data_sources = self.all_data_sources(id);

        match parent {
            Some(parent) if parent.ty == ParameterType::Array => data_sources
                .iter()
                .any(|ds| ds.parameters.contains(&param))
                .then(|| (format!("${{{}}}", parameter.name), format!("${{{new_name}}}"))),
            Some(parent) if parent.ty == ParameterType::Map => Some((
                format!("${{{}.{}}}", parent.name, parameter.name),
                format!("${{{}.{new_name}}}", parent.name),
            )),
            _ if parameter.ty == ParameterType::Map => Some((
                format!("${{{}.", parameter.name),
                format!("${{{new_name}."),
            )),
            _ => {
                let shadowed = data_sources
                    .iter()
                    .flat_map(|ds| ds.parameters.iter())
                    .filter_map(|p| params.get(*p))
                    .any(|p| p.name == parameter.name);
                (!shadowed)
                    .then(|| (format!("${{{}}}", parameter.name), format!("${{{new_name}}}")))
            }
        }
    }

    /// Append a command rewriting references to `param` in `field` of
    /// element `id`, if the field contains any.
    pub fn add_command_for_changed_parameter_name(
        &self,
        id: ObjectId,
        param: ObjectId,
        new_name: &str,
        field: &str,
        group: &mut CommandGroup,
    ) {
        let Some(value) = self.element(id).and_then(|el| el.get_value(field)) else {
            return;
        };
        let Some((reference, replacement)) = self.parameter_references(id, param, new_name) else {
            return;
        };
        match value {
            FieldValue::Text(text) if text.contains(&reference) => {
                let updated = text.replace(&reference, &replacement);
                group.add(Command::set_text(id, field, updated));
            }
            FieldValue::Rich(rich) => {
                let serialized = rich.to_string();
                let reference = json_escaped(&reference);
                if !serialized.contains(&reference) {
                    return;
                }
                let updated = serialized.replace(&reference, &json_escaped(&replacement));
                match serde_json::from_str(&updated) {
                    Ok(updated) => group.add(Command::set_value(
                        id,
                        field,
                        FieldValue::Rich(updated),
                        ValueKind::RichText,
                    )),
                    Err(err) => log::warn!("cannot rewrite {field} of {id}: {err}"),
                }
            }
            _ => {}
        }
    }

    /// Append rewrite commands for every parameter-bearing field of `id`.
    pub fn add_commands_for_changed_parameter_name(
        &self,
        id: ObjectId,
        param: ObjectId,
        new_name: &str,
        group: &mut CommandGroup,
    ) {
        let Some(el) = self.element(id) else {
            return;
        };
        for field in el.kind.capabilities().parameter_fields {
            self.add_command_for_changed_parameter_name(id, param, new_name, field, group);
        }
    }

    /// One undo step renaming `param` to `new_name` and rewriting every
    /// reference to it across the document.
    pub fn commands_for_parameter_rename(&self, param: ObjectId, new_name: &str) -> CommandGroup {
        let mut group = CommandGroup::new("rename parameter");
        if self.parameters().get(param).is_none() {
            log::warn!("rename of missing parameter {param}");
            return group;
        }
        group.add(Command::rename_parameter(param, new_name));

        let mut ids = self.element_ids();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        for id in ids {
            self.add_commands_for_changed_parameter_name(id, param, new_name, &mut group);
        }
        log::debug!("rename {param} -> {new_name}: {} command(s)", group.len());
        group
    }
}

/// `text` as it appears inside a serialized JSON string.
fn json_escaped(text: &str) -> String {
    let quoted = serde_json::Value::String(text.to_owned()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}
