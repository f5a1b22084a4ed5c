//! Containers and the container tree.
//!
//! A container hosts elements. Top-level containers are the page bands
//! (header, content, footer) whose geometry is fixed by the page. All other
//! containers are *linked* to an element (a frame's interior, a table band,
//! a section band, ...) and take their size and position from it.
//!
//! Nesting is tracked in a `StableDiGraph` with parent → child edges so
//! re-parenting and level computation never need back-pointers.

use crate::id::ObjectId;
use crate::kind::ElementKind;
use crate::units::Rect;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandType {
    Header,
    Content,
    Footer,
}

impl BandType {
    pub fn as_str(self) -> &'static str {
        match self {
            BandType::Header => "header",
            BandType::Content => "content",
            BandType::Footer => "footer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "header" => Some(BandType::Header),
            "content" => Some(BandType::Content),
            "footer" => Some(BandType::Footer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// Page band with fixed geometry.
    Band(BandType),
    Frame,
    TableInterior,
    TableBand,
    SectionInterior,
    SectionBand,
}

impl ContainerKind {
    /// Whether an element of `kind` may be placed in this container.
    pub fn is_element_allowed(self, kind: ElementKind) -> bool {
        use ElementKind as K;
        match self {
            ContainerKind::Band(BandType::Content) => {
                !matches!(kind, K::TableText | K::TableBand | K::SectionBand)
            }
            ContainerKind::Band(_) | ContainerKind::Frame => !matches!(
                kind,
                K::PageBreak | K::Section | K::TableText | K::TableBand | K::SectionBand
            ),
            ContainerKind::SectionBand => !matches!(
                kind,
                K::PageBreak | K::TableText | K::TableBand | K::SectionBand
            ),
            ContainerKind::TableBand => kind == K::TableText,
            ContainerKind::TableInterior => kind == K::TableBand,
            ContainerKind::SectionInterior => kind == K::SectionBand,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Container {
    pub id: ObjectId,
    pub kind: ContainerKind,
    /// Element this container is the interior of. `None` for page bands.
    pub owner: Option<ObjectId>,
    /// Absolute position and content size of a page band. Unused for
    /// linked containers.
    pub band_rect: Rect,
    /// Hosted elements in z-order (first is drawn first).
    pub children: Vec<ObjectId>,
    /// Nesting depth; page bands are level 0.
    pub level: usize,
}

impl Container {
    pub fn band(id: ObjectId, band_type: BandType, rect: Rect) -> Self {
        Self {
            id,
            kind: ContainerKind::Band(band_type),
            owner: None,
            band_rect: rect,
            children: Vec::new(),
            level: 0,
        }
    }

    pub fn linked(id: ObjectId, kind: ContainerKind, owner: ObjectId) -> Self {
        Self {
            id,
            kind,
            owner: Some(owner),
            band_rect: Rect::default(),
            children: Vec::new(),
            level: 0,
        }
    }

    pub fn is_element_allowed(&self, kind: ElementKind) -> bool {
        self.kind.is_element_allowed(kind)
    }

    /// Position of `id` among the children.
    pub fn child_position(&self, id: ObjectId) -> Option<usize> {
        self.children.iter().position(|c| *c == id)
    }

    /// Append `id` unless it is already a child.
    pub(crate) fn attach(&mut self, id: ObjectId) {
        if self.child_position(id).is_none() {
            self.children.push(id);
        }
    }

    pub(crate) fn detach(&mut self, id: ObjectId) -> Option<usize> {
        let pos = self.child_position(id)?;
        self.children.remove(pos);
        Some(pos)
    }

    /// Move or insert `id` at `position` (clamped to the end).
    pub(crate) fn place(&mut self, id: ObjectId, position: usize) {
        self.detach(id);
        let position = position.min(self.children.len());
        self.children.insert(position, id);
    }
}

/// All containers of a document plus their nesting.
#[derive(Debug, Default)]
pub struct ContainerTree {
    graph: StableDiGraph<ObjectId, ()>,
    index: HashMap<ObjectId, NodeIndex>,
    containers: HashMap<ObjectId, Container>,
}

impl ContainerTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a container below `parent` (`None` for a page band).
    pub fn insert(&mut self, container: Container, parent: Option<ObjectId>) {
        let id = container.id;
        if self.index.contains_key(&id) {
            self.set_parent(id, parent);
            self.containers.insert(id, container);
            return;
        }
        let idx = self.graph.add_node(id);
        self.index.insert(id, idx);
        self.containers.insert(id, container);
        if let Some(parent_idx) = parent.and_then(|p| self.index.get(&p).copied()) {
            self.graph.add_edge(parent_idx, idx, ());
        }
    }

    /// Remove a container. Nested containers are re-attached nowhere; the
    /// caller removes them first.
    pub fn remove(&mut self, id: ObjectId) -> Option<Container> {
        let idx = self.index.remove(&id)?;
        self.graph.remove_node(idx);
        self.containers.remove(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&Container> {
        self.containers.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Container> {
        self.containers.get_mut(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.containers.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Container> {
        self.containers.values()
    }

    pub fn ids(&self) -> Vec<ObjectId> {
        self.containers.keys().copied().collect()
    }

    pub fn parent(&self, id: ObjectId) -> Option<ObjectId> {
        let idx = *self.index.get(&id)?;
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
            .map(|p| self.graph[p])
    }

    /// Re-parent a container, dropping its previous parent edge.
    pub fn set_parent(&mut self, id: ObjectId, parent: Option<ObjectId>) {
        let Some(&idx) = self.index.get(&id) else {
            return;
        };
        let incoming: Vec<_> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .collect();
        for old_parent in incoming {
            if let Some(edge) = self.graph.find_edge(old_parent, idx) {
                self.graph.remove_edge(edge);
            }
        }
        if let Some(parent_idx) = parent.and_then(|p| self.index.get(&p).copied()) {
            // Never introduce a cycle.
            if parent_idx != idx && !self.is_descendant_idx(parent_idx, idx) {
                self.graph.add_edge(parent_idx, idx, ());
            }
        }
    }

    /// Whether `id` is `ancestor` or nested anywhere below it.
    pub fn is_descendant(&self, id: ObjectId, ancestor: ObjectId) -> bool {
        match (self.index.get(&id), self.index.get(&ancestor)) {
            (Some(&idx), Some(&anc)) => idx == anc || self.is_descendant_idx(idx, anc),
            _ => false,
        }
    }

    fn is_descendant_idx(&self, mut idx: NodeIndex, ancestor: NodeIndex) -> bool {
        while let Some(parent) = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
        {
            if parent == ancestor {
                return true;
            }
            idx = parent;
        }
        false
    }

    /// Recompute the level of one container from its parent chain.
    pub fn init_level(&mut self, id: ObjectId) {
        let Some(&start) = self.index.get(&id) else {
            return;
        };
        let mut level = 0;
        let mut idx = start;
        while let Some(parent) = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
        {
            level += 1;
            idx = parent;
        }
        if let Some(container) = self.containers.get_mut(&id) {
            container.level = level;
        }
    }

    /// Recompute the level of every container.
    pub fn init_levels(&mut self) {
        for id in self.ids() {
            self.init_level(id);
        }
    }
}
