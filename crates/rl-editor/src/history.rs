//! Undo/Redo history.
//!
//! Every user action reaches the document as one [`CommandGroup`]. Groups
//! are pushed to the undo stack once applied; undo reverts the top group and
//! moves it to the redo stack.
//!
//! Several actions can be merged into one undo step with
//! [`History::begin_batch`] / [`History::end_batch`]: commands executed in
//! between are applied live and collected into a single group.

use rl_core::{CommandGroup, Document, LayoutConfig};

pub struct History {
    undo_stack: Vec<CommandGroup>,
    redo_stack: Vec<CommandGroup>,
    /// Maximum undo depth.
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Commands collected by the open batch.
    batch: CommandGroup,
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth),
            redo_stack: Vec::new(),
            max_depth,
            batch_depth: 0,
            batch: CommandGroup::default(),
        }
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.max_undo_depth)
    }

    /// Start a batch. Nested batches join the outermost one.
    pub fn begin_batch(&mut self, description: &str) {
        if self.batch_depth == 0 {
            self.batch = CommandGroup::new(description);
        }
        self.batch_depth += 1;
    }

    /// Close a batch. When the outermost batch closes its commands become
    /// one undo step, unless there are none.
    pub fn end_batch(&mut self) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            let batch = std::mem::take(&mut self.batch);
            self.push(batch);
        }
    }

    /// Apply `group` and record it.
    pub fn execute(&mut self, doc: &mut Document, mut group: CommandGroup) {
        group.apply(doc);
        self.push(group);
    }

    /// Record a group that has already been applied. Empty groups are
    /// dropped.
    pub fn push(&mut self, group: CommandGroup) {
        if group.is_empty() {
            return;
        }
        if self.batch_depth > 0 {
            for command in group.commands() {
                self.batch.add(command.clone());
            }
            return;
        }
        log::debug!("history: push {:?} ({} commands)", group.description, group.len());
        self.undo_stack.push(group);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        // New action invalidates redo.
        self.redo_stack.clear();
    }

    /// Undo the last group, returning its description.
    pub fn undo(&mut self, doc: &mut Document) -> Option<String> {
        let mut group = self.undo_stack.pop()?;
        group.revert(doc);
        let description = group.description.clone();
        self.redo_stack.push(group);
        Some(description)
    }

    /// Redo the last undone group, returning its description.
    pub fn redo(&mut self, doc: &mut Document) -> Option<String> {
        let mut group = self.redo_stack.pop()?;
        group.apply(doc);
        let description = group.description.clone();
        self.undo_stack.push(group);
        Some(description)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
