// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure and the store that mutates it.

use crate::edge::{Edge, EdgeId};
use crate::id::{IdGenerator, NodeId};
use crate::node::{Node, NodeData, NodePatch, Position};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Offset applied to a duplicated node's position, on both axes
pub const DUPLICATE_OFFSET: f64 = 50.0;

/// Suffix appended to a duplicated node's label
pub const DUPLICATE_LABEL_SUFFIX: &str = " (Copy)";

/// Graph content: nodes and edges keyed by id, in insertion order.
///
/// A `Graph` value is always an owned copy. The live graph sits inside a
/// [`GraphStore`] and is only reachable mutably through its operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    nodes: IndexMap<NodeId, Node>,
    edges: IndexMap<EdgeId, Edge>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a node by ID
    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    /// Check whether a node is present
    pub fn contains_node(&self, node_id: &NodeId) -> bool {
        self.nodes.contains_key(node_id)
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get an edge by ID
    pub fn edge(&self, edge_id: &EdgeId) -> Option<&Edge> {
        self.edges.get(edge_id)
    }

    /// Get all edges
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Check whether an edge is present
    pub fn contains_edge(&self, edge_id: &EdgeId) -> bool {
        self.edges.contains_key(edge_id)
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Get edges touching a node
    pub fn edges_for_node<'a>(&'a self, node_id: &'a NodeId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.values().filter(move |e| e.involves_node(node_id))
    }

    /// The edge from `source` to `target`, whatever id it was stored under
    pub fn edge_between(&self, source: &NodeId, target: &NodeId) -> Option<&Edge> {
        let joins = |e: &&Edge| e.source == *source && e.target == *target;
        match self.edges.get(&EdgeId::between(source, target)).filter(joins) {
            Some(edge) => Some(edge),
            None => self.edges.values().find(joins),
        }
    }

    /// An id for a new `source` to `target` edge that no stored edge holds.
    ///
    /// Usually the derived id. Node ids containing `-` can make two pairs
    /// derive the same id; the later pair then gets a `#n` suffix.
    pub(crate) fn unused_edge_id(&self, source: &NodeId, target: &NodeId) -> EdgeId {
        let derived = EdgeId::between(source, target);
        if !self.edges.contains_key(&derived) {
            return derived;
        }
        let mut n = 1_u64;
        loop {
            let id = EdgeId(format!("{derived}#{n}"));
            if !self.edges.contains_key(&id) {
                return id;
            }
            n += 1;
        }
    }

    /// Check if the graph has no nodes and no edges
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Check that every edge points at nodes in this graph
    pub fn is_consistent(&self) -> bool {
        self.edges
            .values()
            .all(|e| self.nodes.contains_key(&e.source) && self.nodes.contains_key(&e.target))
    }

    /// Insert a node unless its id is already taken. Returns whether it was inserted.
    pub(crate) fn insert_node(&mut self, node: Node) -> bool {
        if self.nodes.contains_key(&node.id) {
            return false;
        }
        self.nodes.insert(node.id.clone(), node);
        true
    }

    /// Insert an edge unless its id is already taken. Returns whether it was inserted.
    pub(crate) fn insert_edge(&mut self, edge: Edge) -> bool {
        if self.edges.contains_key(&edge.id) {
            return false;
        }
        self.edges.insert(edge.id.clone(), edge);
        true
    }
}

/// Nodes and edges removed by a delete
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteReport {
    /// Removed nodes
    pub nodes: Vec<Node>,
    /// Edges removed because they touched a removed node
    pub edges: Vec<Edge>,
}

impl DeleteReport {
    /// Check whether anything was removed
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Error returned by graph store operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Edge not found
    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),
}

/// Result type for graph store operations
pub type Result<T> = std::result::Result<T, GraphError>;

/// Authoritative owner of a graph.
///
/// All mutation goes through the methods below. Each one is a single step
/// with respect to the graph invariants: no caller can observe a node
/// removed while its edges remain.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    graph: Graph,
    ids: IdGenerator,
}

impl GraphStore {
    /// Create an empty store with a fresh id generator
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store using the given id generator
    pub fn with_generator(ids: IdGenerator) -> Self {
        Self {
            graph: Graph::new(),
            ids,
        }
    }

    /// Read-only view of the live graph
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The store's id generator
    pub fn id_generator(&self) -> &IdGenerator {
        &self.ids
    }

    /// Next generated id that no node in the graph holds
    fn fresh_node_id(&mut self) -> NodeId {
        loop {
            let id = self.ids.next_node_id();
            if !self.graph.contains_node(&id) {
                return id;
            }
        }
    }

    /// Add a new node
    pub fn add_node(&mut self, type_id: impl Into<String>, position: Position, data: NodeData) -> Node {
        let id = self.fresh_node_id();
        let node = Node::new(id, type_id, position, data);
        tracing::debug!("Added node {} ({})", node.id, node.type_id);
        self.graph.insert_node(node.clone());
        node
    }

    /// Merge `patch` into an existing node
    pub fn update_node(&mut self, node_id: &NodeId, patch: NodePatch) -> Result<&Node> {
        let node = self
            .graph
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.clone()))?;
        node.apply(patch);
        Ok(node)
    }

    /// Move a node. Called at pointer-move frequency, so it touches nothing else.
    pub fn move_node(&mut self, node_id: &NodeId, position: Position) -> Result<()> {
        let node = self
            .graph
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.clone()))?;
        node.position = position;
        Ok(())
    }

    /// Remove a node and its edges. Removing an absent node does nothing.
    pub fn delete_node(&mut self, node_id: &NodeId) -> Option<Node> {
        let node = self.graph.nodes.shift_remove(node_id)?;
        let before = self.graph.edges.len();
        self.graph.edges.retain(|_, e| !e.involves_node(node_id));
        tracing::debug!(
            "Deleted node {} and {} edge(s)",
            node_id,
            before - self.graph.edges.len()
        );
        Some(node)
    }

    /// Remove several nodes and every edge touching any of them
    pub fn delete_nodes<'a>(&mut self, node_ids: impl IntoIterator<Item = &'a NodeId>) -> DeleteReport {
        let doomed: HashSet<&NodeId> = node_ids
            .into_iter()
            .filter(|id| self.graph.nodes.contains_key(*id))
            .collect();
        if doomed.is_empty() {
            return DeleteReport::default();
        }

        let mut report = DeleteReport::default();
        let (removed_edges, kept_edges): (IndexMap<_, _>, IndexMap<_, _>) =
            std::mem::take(&mut self.graph.edges)
                .into_iter()
                .partition(|(_, e)| doomed.contains(&e.source) || doomed.contains(&e.target));
        self.graph.edges = kept_edges;
        report.edges = removed_edges.into_values().collect();

        let (removed_nodes, kept_nodes): (IndexMap<_, _>, IndexMap<_, _>) =
            std::mem::take(&mut self.graph.nodes)
                .into_iter()
                .partition(|(id, _)| doomed.contains(id));
        self.graph.nodes = kept_nodes;
        report.nodes = removed_nodes.into_values().collect();

        tracing::debug!(
            "Deleted {} node(s) and {} edge(s)",
            report.nodes.len(),
            report.edges.len()
        );
        report
    }

    /// Copy a node with a fresh id, an offset position and a copy label. Edges are not copied.
    pub fn duplicate_node(&mut self, node_id: &NodeId) -> Result<Node> {
        let source = self
            .graph
            .nodes
            .get(node_id)
            .cloned()
            .ok_or_else(|| GraphError::NodeNotFound(node_id.clone()))?;

        let mut copy = source.clone();
        copy.id = self.fresh_node_id();
        copy.position = source.position.offset(DUPLICATE_OFFSET, DUPLICATE_OFFSET);
        copy.label = format!("{}{DUPLICATE_LABEL_SUFFIX}", source.label);

        tracing::debug!("Duplicated node {} as {}", node_id, copy.id);
        self.graph.insert_node(copy.clone());
        Ok(copy)
    }

    /// Connect `source` to `target`.
    ///
    /// Connecting a pair that is already connected returns the existing edge.
    /// Self-loops are allowed.
    pub fn connect(&mut self, source: &NodeId, target: &NodeId) -> Result<Edge> {
        for endpoint in [source, target] {
            if !self.graph.nodes.contains_key(endpoint) {
                return Err(GraphError::NodeNotFound(endpoint.clone()));
            }
        }

        if let Some(existing) = self.graph.edge_between(source, target) {
            return Ok(existing.clone());
        }

        let edge = Edge {
            id: self.graph.unused_edge_id(source, target),
            source: source.clone(),
            target: target.clone(),
        };
        tracing::debug!("Connected {} -> {} as {}", source, target, edge.id);
        self.graph.insert_edge(edge.clone());
        Ok(edge)
    }

    /// Remove an edge. Removing an absent edge does nothing.
    pub fn delete_edge(&mut self, edge_id: &EdgeId) -> Option<Edge> {
        self.graph.edges.shift_remove(edge_id)
    }

    /// Remove every node and edge
    pub fn clear(&mut self) {
        self.graph.nodes.clear();
        self.graph.edges.clear();
    }

    /// Owned copy of the current graph
    pub fn snapshot(&self) -> Graph {
        self.graph.clone()
    }

    /// Swap in a whole graph, e.g. after a load.
    ///
    /// The id generator advances past the loaded ids so new nodes never
    /// collide with them.
    pub fn replace(&mut self, graph: Graph) {
        self.ids.observe(graph.node_ids());
        self.graph = graph;
    }
}
