// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interaction controller.
//!
//! Turns canvas gestures (palette drops, drags, connection drags, clicks and
//! key presses) into graph store operations. The controller is the only
//! writer into its [`GraphStore`]; everything else reads through
//! [`InteractionController::graph`].

use crate::gate::{AlwaysConfirm, ConfirmationGate, PendingAction};
use crate::projection::CanvasProjection;
use blockboard_graph::{
    DeleteReport, DragPayload, Edge, EdgeId, Graph, GraphError, GraphStore, Node, NodeData, NodeId,
    NodePatch, Position, SelectMode, Selection,
};

/// Gesture currently in progress
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    /// Nothing in progress
    #[default]
    Idle,
    /// A node is being dragged
    DraggingNode {
        /// Node being dragged
        node: NodeId,
        /// Where the drag started
        origin: Position,
    },
    /// A connection is being dragged out of an output handle
    Connecting {
        /// Node whose output handle started the drag
        source: NodeId,
    },
}

/// What a connection drag was released over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Empty canvas
    Canvas,
    /// A node's input handle
    InputHandle(NodeId),
    /// A node's output handle
    OutputHandle(NodeId),
}

/// Keys the controller reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Delete
    Delete,
    /// Backspace
    Backspace,
    /// Any other key
    Other,
}

/// Drives a [`GraphStore`] from UI gestures
#[derive(Debug)]
pub struct InteractionController<G = AlwaysConfirm> {
    store: GraphStore,
    selection: Selection,
    gesture: Gesture,
    gate: G,
    confirm_destructive: bool,
}

impl Default for InteractionController<AlwaysConfirm> {
    fn default() -> Self {
        Self::new(AlwaysConfirm)
    }
}

impl<G: ConfirmationGate> InteractionController<G> {
    /// Controller over an empty store
    pub fn new(gate: G) -> Self {
        Self::with_store(GraphStore::new(), gate)
    }

    /// Controller over an existing store
    pub fn with_store(store: GraphStore, gate: G) -> Self {
        Self {
            store,
            selection: Selection::new(),
            gesture: Gesture::Idle,
            gate,
            confirm_destructive: true,
        }
    }

    /// Whether destructive batch gestures ask the gate first
    pub fn confirm_destructive(mut self, enabled: bool) -> Self {
        self.confirm_destructive = enabled;
        self
    }

    /// The live graph
    pub fn graph(&self) -> &Graph {
        self.store.graph()
    }

    /// The underlying store
    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Current selection
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Gesture in progress
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// The confirmation gate
    pub fn gate_mut(&mut self) -> &mut G {
        &mut self.gate
    }

    // ---------------------------------------------------------------------
    // Palette
    // ---------------------------------------------------------------------

    /// Drop a palette item at a screen position
    pub fn drop_on_canvas(
        &mut self,
        payload: &DragPayload,
        screen: Position,
        projection: &dyn CanvasProjection,
    ) -> Option<Node> {
        if !payload.is_block() {
            tracing::debug!("Ignoring drop of non-block payload {:?}", payload.kind);
            return None;
        }

        let position = projection.screen_to_canvas(screen);
        let data = NodeData::labelled(format!("New {}", payload.node_type));
        let node = self.store.add_node(payload.node_type.clone(), position, data);
        tracing::debug!("Dropped {} at ({}, {})", node.id, position.x, position.y);
        Some(node)
    }

    /// Drop a serialized palette payload, as read from a transfer buffer
    pub fn drop_transfer(
        &mut self,
        data: &str,
        screen: Position,
        projection: &dyn CanvasProjection,
    ) -> Option<Node> {
        match DragPayload::from_json(data) {
            Ok(payload) => self.drop_on_canvas(&payload, screen, projection),
            Err(e) => {
                tracing::warn!("Ignoring unreadable drop payload: {e}");
                None
            }
        }
    }

    // ---------------------------------------------------------------------
    // Node drag
    // ---------------------------------------------------------------------

    /// Start dragging a node
    pub fn begin_node_drag(&mut self, node_id: &NodeId) -> Result<(), GraphError> {
        let node = self
            .store
            .graph()
            .node(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.clone()))?;
        self.gesture = Gesture::DraggingNode {
            node: node_id.clone(),
            origin: node.position,
        };
        Ok(())
    }

    /// Move the dragged node. Does nothing when no node drag is in progress.
    pub fn drag_node_to(&mut self, position: Position) -> Result<(), GraphError> {
        if let Gesture::DraggingNode { node, .. } = &self.gesture {
            self.store.move_node(node, position)?;
        }
        Ok(())
    }

    /// Finish the node drag, returning the node that was dragged
    pub fn end_node_drag(&mut self) -> Option<NodeId> {
        match std::mem::take(&mut self.gesture) {
            Gesture::DraggingNode { node, .. } => Some(node),
            other => {
                self.gesture = other;
                None
            }
        }
    }

    /// Abort the node drag, putting the node back where the drag started
    pub fn cancel_node_drag(&mut self) -> Result<(), GraphError> {
        if !matches!(self.gesture, Gesture::DraggingNode { .. }) {
            return Ok(());
        }
        if let Gesture::DraggingNode { node, origin } = std::mem::take(&mut self.gesture) {
            self.store.move_node(&node, origin)?;
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Connection drag
    // ---------------------------------------------------------------------

    /// Start dragging a connection out of `source`'s output handle
    pub fn begin_connection(&mut self, source: &NodeId) -> Result<(), GraphError> {
        if !self.store.graph().contains_node(source) {
            return Err(GraphError::NodeNotFound(source.clone()));
        }
        self.gesture = Gesture::Connecting {
            source: source.clone(),
        };
        Ok(())
    }

    /// Release the connection drag over `target`.
    ///
    /// Only an input handle of an existing node produces an edge; anything
    /// else cancels the gesture without touching the graph.
    pub fn finish_connection(&mut self, target: DropTarget) -> Option<Edge> {
        if !matches!(self.gesture, Gesture::Connecting { .. }) {
            return None;
        }
        let Gesture::Connecting { source } = std::mem::take(&mut self.gesture) else {
            return None;
        };

        let DropTarget::InputHandle(target) = target else {
            tracing::debug!("Connection from {} cancelled", source);
            return None;
        };

        match self.store.connect(&source, &target) {
            Ok(edge) => Some(edge),
            Err(e) => {
                tracing::debug!("Connection cancelled: {e}");
                None
            }
        }
    }

    /// Abort any connection drag in progress
    pub fn cancel_connection(&mut self) {
        if matches!(self.gesture, Gesture::Connecting { .. }) {
            self.gesture = Gesture::Idle;
        }
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    /// Click a node. Shift-click toggles it, a plain click selects only it.
    pub fn click_node(&mut self, node_id: &NodeId, shift: bool) {
        if !self.store.graph().contains_node(node_id) {
            return;
        }
        if shift {
            self.selection.toggle(node_id.clone());
        } else {
            self.selection.select_only(node_id.clone());
        }
    }

    /// Click empty canvas
    pub fn click_canvas(&mut self) {
        self.selection.clear();
    }

    /// Select every node whose position lies in the rectangle spanned by `from` and `to`
    pub fn marquee_select(&mut self, from: Position, to: Position, mode: SelectMode) {
        let (min_x, max_x) = (from.x.min(to.x), from.x.max(to.x));
        let (min_y, max_y) = (from.y.min(to.y), from.y.max(to.y));
        let inside: Vec<NodeId> = self
            .store
            .graph()
            .nodes()
            .filter(|n| {
                (min_x..=max_x).contains(&n.position.x) && (min_y..=max_y).contains(&n.position.y)
            })
            .map(|n| n.id.clone())
            .collect();
        self.selection.apply(mode, inside);
    }

    /// Programmatic selection change. Unknown ids are ignored.
    pub fn select(&mut self, ids: impl IntoIterator<Item = NodeId>, mode: SelectMode) {
        let graph = self.store.graph();
        let known: Vec<NodeId> = ids.into_iter().filter(|id| graph.contains_node(id)).collect();
        self.selection.apply(mode, known);
    }

    // ---------------------------------------------------------------------
    // Keyboard and destructive gestures
    // ---------------------------------------------------------------------

    /// Handle a key press
    pub fn handle_key(&mut self, key: Key) -> Option<DeleteReport> {
        match key {
            Key::Delete | Key::Backspace => self.delete_selection(),
            Key::Other => None,
        }
    }

    /// Delete every selected node, after confirmation
    pub fn delete_selection(&mut self) -> Option<DeleteReport> {
        if self.selection.is_empty() {
            return None;
        }
        let action = PendingAction::DeleteSelection {
            nodes: self.selection.len(),
        };
        if !self.approve(&action) {
            return None;
        }

        let report = self.store.delete_nodes(self.selection.iter());
        self.selection.clear();
        self.drop_stale_gesture();
        tracing::debug!(
            "Deleted selection: {} node(s), {} edge(s)",
            report.nodes.len(),
            report.edges.len()
        );
        Some(report)
    }

    /// Remove everything, after confirmation. Returns whether the graph was cleared.
    pub fn clear_all(&mut self) -> bool {
        let graph = self.store.graph();
        let action = PendingAction::ClearAll {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
        };
        if !self.approve(&action) {
            return false;
        }

        self.store.clear();
        self.selection.clear();
        self.gesture = Gesture::Idle;
        true
    }

    /// Delete a single edge
    pub fn delete_edge(&mut self, edge_id: &EdgeId) -> Option<Edge> {
        self.store.delete_edge(edge_id)
    }

    fn approve(&mut self, action: &PendingAction) -> bool {
        if !self.confirm_destructive || self.gate.confirm(action) {
            return true;
        }
        tracing::debug!("Declined: {}", action.prompt());
        false
    }

    fn drop_stale_gesture(&mut self) {
        let graph = self.store.graph();
        let stale = match &self.gesture {
            Gesture::Idle => false,
            Gesture::DraggingNode { node, .. } => !graph.contains_node(node),
            Gesture::Connecting { source } => !graph.contains_node(source),
        };
        if stale {
            self.gesture = Gesture::Idle;
        }
    }

    // ---------------------------------------------------------------------
    // Editing
    // ---------------------------------------------------------------------

    /// Prompt for a new label and apply it. Returns whether the label changed.
    pub fn edit_label(&mut self, node_id: &NodeId) -> Result<bool, GraphError> {
        let current = self
            .store
            .graph()
            .node(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.clone()))?
            .label
            .clone();
        match self.gate.prompt_label(&current) {
            Some(label) => self.rename(node_id, &label),
            None => Ok(false),
        }
    }

    /// Set a node's label if `label` is non-empty and different. Returns whether it changed.
    pub fn rename(&mut self, node_id: &NodeId, label: &str) -> Result<bool, GraphError> {
        let label = label.trim();
        let node = self
            .store
            .graph()
            .node(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.clone()))?;
        if label.is_empty() || node.label == label {
            return Ok(false);
        }
        self.store.update_node(node_id, NodePatch::label(label))?;
        Ok(true)
    }

    /// Duplicate a node and select only the copy
    pub fn duplicate(&mut self, node_id: &NodeId) -> Result<Node, GraphError> {
        let copy = self.store.duplicate_node(node_id)?;
        self.selection.select_only(copy.id.clone());
        Ok(copy)
    }

    /// Apply an arbitrary patch to a node
    pub fn update(&mut self, node_id: &NodeId, patch: NodePatch) -> Result<(), GraphError> {
        self.store.update_node(node_id, patch).map(|_| ())
    }

    // ---------------------------------------------------------------------
    // Session
    // ---------------------------------------------------------------------

    /// Replace the whole graph, e.g. with a loaded document
    pub fn load_graph(&mut self, graph: Graph) {
        self.store.replace(graph);
        self.selection.clear();
        self.gesture = Gesture::Idle;
    }
}
