//! Report data parameters.
//!
//! Parameters are what `${...}` expressions in element fields refer to.
//! Collection parameters (`array`) carry per-row child parameters and act as
//! data sources for tables and sections; `map` parameters group named
//! children that are referenced as `${map.child}`.

use crate::error::DocumentError;
use crate::id::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    #[default]
    String,
    Number,
    Boolean,
    Date,
    Image,
    Array,
    SimpleArray,
    Map,
    Sum,
    Average,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub id: ObjectId,
    pub name: String,
    pub ty: ParameterType,
    pub parent: Option<ObjectId>,
    pub children: Vec<ObjectId>,
}

/// Nested JSON form used when loading parameters.
#[derive(Debug, Deserialize)]
struct ParameterSpec {
    id: ObjectId,
    name: String,
    #[serde(rename = "type", default)]
    ty: ParameterType,
    #[serde(default)]
    children: Vec<ParameterSpec>,
}

#[derive(Debug, Clone, Default)]
pub struct ParameterSet {
    params: HashMap<ObjectId, Parameter>,
    roots: Vec<ObjectId>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON array of (possibly nested) parameter definitions.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let specs: Vec<ParameterSpec> = serde_json::from_str(json)?;
        let mut set = Self::new();
        for spec in specs {
            set.insert_spec(spec, None);
        }
        Ok(set)
    }

    fn insert_spec(&mut self, spec: ParameterSpec, parent: Option<ObjectId>) {
        let id = self.add(spec.id, &spec.name, spec.ty, parent);
        for child in spec.children {
            self.insert_spec(child, Some(id));
        }
    }

    /// Add a parameter, as a child of `parent` or as a root parameter.
    pub fn add(
        &mut self,
        id: ObjectId,
        name: &str,
        ty: ParameterType,
        parent: Option<ObjectId>,
    ) -> ObjectId {
        self.params.insert(
            id,
            Parameter {
                id,
                name: name.to_string(),
                ty,
                parent,
                children: Vec::new(),
            },
        );
        match parent.and_then(|p| self.params.get_mut(&p)) {
            Some(parent) => parent.children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&Parameter> {
        self.params.get(&id)
    }

    pub fn parent_of(&self, id: ObjectId) -> Option<&Parameter> {
        self.get(id)?.parent.and_then(|p| self.get(p))
    }

    /// Root parameter with the given name.
    pub fn by_name(&self, name: &str) -> Option<&Parameter> {
        self.roots
            .iter()
            .filter_map(|id| self.params.get(id))
            .find(|p| p.name == name)
    }

    pub fn children(&self, id: ObjectId) -> impl Iterator<Item = &Parameter> {
        self.params
            .get(&id)
            .map(|p| p.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|c| self.params.get(c))
    }

    /// Set a parameter's name, returning the previous one.
    pub fn rename(&mut self, id: ObjectId, name: &str) -> Option<String> {
        let param = self.params.get_mut(&id)?;
        Some(std::mem::replace(&mut param.name, name.to_string()))
    }
}
