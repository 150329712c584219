// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edge definitions for the graph.

use crate::id::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
    /// Wrap an existing id string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id an edge from `source` to `target` receives.
    ///
    /// Derived rather than generated, so wiring the same pair twice lands on
    /// the same id.
    pub fn between(source: &NodeId, target: &NodeId) -> Self {
        Self(format!("e{source}-{target}"))
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A directed connection from one node's output to another node's input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Edge ID
    pub id: EdgeId,
    /// Source node ID
    pub source: NodeId,
    /// Target node ID
    pub target: NodeId,
}

impl Edge {
    /// Create a new edge with its derived id
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self {
            id: EdgeId::between(&source, &target),
            source,
            target,
        }
    }

    /// Check if this edge involves a specific node
    pub fn involves_node(&self, node_id: &NodeId) -> bool {
        self.source == *node_id || self.target == *node_id
    }

    /// Check if this edge starts and ends at the same node
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_id_is_derived_from_endpoints() {
        let a = NodeId::from("node_1");
        let b = NodeId::from("node_2");
        assert_eq!(Edge::new(a.clone(), b.clone()).id, Edge::new(a.clone(), b.clone()).id);
        assert_ne!(EdgeId::between(&a, &b), EdgeId::between(&b, &a));
        assert_eq!(EdgeId::between(&a, &b).as_str(), "enode_1-node_2");
    }

    #[test]
    fn test_involves_node() {
        let edge = Edge::new(NodeId::from("node_1"), NodeId::from("node_2"));
        assert!(edge.involves_node(&NodeId::from("node_1")));
        assert!(edge.involves_node(&NodeId::from("node_2")));
        assert!(!edge.involves_node(&NodeId::from("node_3")));
        assert!(!edge.is_self_loop());
    }
}
