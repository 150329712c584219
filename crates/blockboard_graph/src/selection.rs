// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node selection state.
//!
//! The selection is a view over the graph. It is never persisted and never
//! mutates the graph itself.

use crate::graph::Graph;
use crate::id::NodeId;
use indexmap::IndexSet;

/// Selection mode for multi-select operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectMode {
    /// Replace current selection
    #[default]
    Set,
    /// Add to current selection (Shift+Click)
    Add,
    /// Remove from current selection
    Remove,
    /// Toggle in current selection
    Toggle,
}

/// Set of selected node ids, in selection order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    nodes: IndexSet<NodeId>,
}

impl Selection {
    /// Create a new empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a node is selected
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains(id)
    }

    /// Add a node to the selection (idempotent)
    pub fn add(&mut self, id: NodeId) {
        self.nodes.insert(id);
    }

    /// Remove a node from the selection
    pub fn remove(&mut self, id: &NodeId) {
        self.nodes.shift_remove(id);
    }

    /// Toggle a node in the selection
    pub fn toggle(&mut self, id: NodeId) {
        if !self.nodes.shift_remove(&id) {
            self.nodes.insert(id);
        }
    }

    /// Make `id` the only selected node
    pub fn select_only(&mut self, id: NodeId) {
        self.nodes.clear();
        self.nodes.insert(id);
    }

    /// Apply `mode` to every id in `ids`
    pub fn apply(&mut self, mode: SelectMode, ids: impl IntoIterator<Item = NodeId>) {
        if mode == SelectMode::Set {
            self.nodes.clear();
        }
        for id in ids {
            match mode {
                SelectMode::Set | SelectMode::Add => self.add(id),
                SelectMode::Remove => self.remove(&id),
                SelectMode::Toggle => self.toggle(id),
            }
        }
    }

    /// Drop ids that no longer name a node in `graph`
    pub fn retain_existing(&mut self, graph: &Graph) {
        self.nodes.retain(|id| graph.contains_node(id));
    }

    /// Clear the selection
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Check if the selection is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the number of selected nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Iterate over selected node ids
    pub fn iter(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter()
    }

    /// Get the primary (last) selected node
    pub fn primary(&self) -> Option<&NodeId> {
        self.nodes.last()
    }
}
