// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node identifiers and their generator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix shared by every generated node id
pub const NODE_ID_PREFIX: &str = "node_";

/// Unique identifier for a node within a graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Wrap an existing id string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric suffix of a generated id, if this id has one.
    pub fn generated_suffix(&self) -> Option<u64> {
        self.0.strip_prefix(NODE_ID_PREFIX)?.parse().ok()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Monotonic node id generator.
///
/// Each [`GraphStore`](crate::GraphStore) owns its own generator, so two
/// editor sessions in one process never share a counter.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    /// Create a generator that starts at `node_1`
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator whose next id follows `last`
    pub fn starting_after(last: u64) -> Self {
        Self { last }
    }

    /// Allocate the next node id.
    ///
    /// After `node_18446744073709551615` the counter restarts at `node_1`.
    /// The store skips any id that is still taken.
    pub fn next_node_id(&mut self) -> NodeId {
        self.last = self.last.checked_add(1).unwrap_or(1);
        NodeId(format!("{NODE_ID_PREFIX}{}", self.last))
    }

    /// Highest suffix handed out or observed so far
    pub fn last(&self) -> u64 {
        self.last
    }

    /// Advance past every generated-looking id in `ids`.
    ///
    /// The counter never moves backwards, so ids returned before a load stay
    /// distinct from ids returned after it.
    pub fn observe<'a>(&mut self, ids: impl IntoIterator<Item = &'a NodeId>) {
        let highest = ids
            .into_iter()
            .filter_map(NodeId::generated_suffix)
            .max()
            .unwrap_or(0);
        self.last = self.last.max(highest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_node_id().as_str(), "node_1");
        assert_eq!(ids.next_node_id().as_str(), "node_2");
        assert_eq!(ids.last(), 2);
    }

    #[test]
    fn test_observe_continues_from_highest_suffix() {
        let mut ids = IdGenerator::new();
        let loaded = [NodeId::from("node_7"), NodeId::from("node_3"), NodeId::from("custom")];
        ids.observe(&loaded);
        assert_eq!(ids.next_node_id().as_str(), "node_8");
    }

    #[test]
    fn test_observe_never_moves_backwards() {
        let mut ids = IdGenerator::starting_after(10);
        ids.observe(&[NodeId::from("node_2")]);
        ids.observe(std::iter::empty());
        assert_eq!(ids.next_node_id().as_str(), "node_11");
    }

    #[test]
    fn test_counter_restarts_after_max() {
        let mut ids = IdGenerator::new();
        ids.observe(&[NodeId::from("node_18446744073709551615")]);
        assert_eq!(ids.last(), u64::MAX);
        assert_eq!(ids.next_node_id().as_str(), "node_1");
    }

    #[test]
    fn test_generated_suffix() {
        assert_eq!(NodeId::from("node_42").generated_suffix(), Some(42));
        assert_eq!(NodeId::from("node_x").generated_suffix(), None);
        assert_eq!(NodeId::from("dndnode_1").generated_suffix(), None);
    }
}
