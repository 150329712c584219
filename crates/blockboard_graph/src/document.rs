// SPDX-License-Identifier: MIT OR Apache-2.0
//! JSON document format for saved, loaded and exported graphs.
//!
//! The field names here are the wire contract shared with the browser
//! canvas and must not change:
//!
//! ```json
//! {
//!   "nodes": [{ "id": "node_1", "type": "customNode", "position": {"x": 0, "y": 0},
//!               "data": { "label": "", "type": "Deploy", "description": "",
//!                         "status": "idle", "config": {} } }],
//!   "edges": [{ "id": "enode_1-node_2", "source": "node_1", "target": "node_2" }],
//!   "timestamp": "2024-01-01T00:00:00.000Z"
//! }
//! ```
//!
//! Decoding is tolerant. A document missing `nodes` or `edges` loads with
//! that collection empty, and entries that cannot be decoded are skipped.

use crate::catalog::BlockDefinition;
use crate::edge::{Edge, EdgeId};
use crate::graph::Graph;
use crate::id::NodeId;
use crate::node::{Node, NodeConfig, NodeStatus, Position};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Node kind tag the canvas renders blocks with
pub const NODE_KIND: &str = "customNode";

fn node_kind() -> String {
    NODE_KIND.to_string()
}

/// Error decoding or encoding a document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Invalid JSON
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Top-level value is not an object
    #[error("Document is not a JSON object")]
    NotAnObject,
}

/// Result type for document operations
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Wire form of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    /// Node ID
    pub id: NodeId,
    /// Canvas node kind, always `customNode` when written
    #[serde(rename = "type", default = "node_kind")]
    pub kind: String,
    /// Canvas position
    #[serde(default)]
    pub position: Position,
    /// Block data
    #[serde(default)]
    pub data: NodeDataDocument,
}

/// Wire form of a node's data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDataDocument {
    /// Display label
    #[serde(default)]
    pub label: String,
    /// Block type
    #[serde(rename = "type", default)]
    pub block_type: String,
    /// Description, empty when unset
    #[serde(default)]
    pub description: String,
    /// Run status
    #[serde(default)]
    pub status: NodeStatus,
    /// Configuration bag
    #[serde(default)]
    pub config: NodeConfig,
}

impl From<&Node> for NodeDocument {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            kind: node_kind(),
            position: node.position,
            data: NodeDataDocument {
                label: node.label.clone(),
                block_type: node.type_id.clone(),
                description: node.description.clone().unwrap_or_default(),
                status: node.status,
                config: node.config.clone(),
            },
        }
    }
}

impl From<NodeDocument> for Node {
    fn from(doc: NodeDocument) -> Self {
        Self {
            id: doc.id,
            type_id: doc.data.block_type,
            position: doc.position,
            label: doc.data.label,
            description: Some(doc.data.description).filter(|d| !d.is_empty()),
            status: doc.data.status,
            config: doc.data.config,
        }
    }
}

/// Wire form of an edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDocument {
    /// Edge ID
    pub id: EdgeId,
    /// Source node ID
    pub source: NodeId,
    /// Target node ID
    pub target: NodeId,
}

impl From<&Edge> for EdgeDocument {
    fn from(edge: &Edge) -> Self {
        Self {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
        }
    }
}

impl From<EdgeDocument> for Edge {
    fn from(doc: EdgeDocument) -> Self {
        Self {
            id: doc.id,
            source: doc.source,
            target: doc.target,
        }
    }
}

/// Saved graph document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Nodes
    #[serde(default)]
    pub nodes: Vec<NodeDocument>,
    /// Edges
    #[serde(default)]
    pub edges: Vec<EdgeDocument>,
    /// Save time, RFC 3339
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl GraphDocument {
    /// Document for `graph` without a timestamp
    pub fn from_graph(graph: &Graph) -> Self {
        Self {
            nodes: graph.nodes().map(NodeDocument::from).collect(),
            edges: graph.edges().map(EdgeDocument::from).collect(),
            timestamp: None,
        }
    }

    /// Set the save timestamp
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Encode as pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode a document, tolerating missing or malformed collections
    pub fn from_json(json: &str) -> Result<(Self, LoadReport)> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(mut root) = value else {
            return Err(DocumentError::NotAnObject);
        };

        let mut report = LoadReport::default();
        let (nodes, missing_nodes, skipped_nodes) = decode_collection(root.remove("nodes"));
        let (edges, missing_edges, skipped_edges) = decode_collection(root.remove("edges"));
        report.missing_nodes = missing_nodes;
        report.missing_edges = missing_edges;
        report.skipped_nodes = skipped_nodes;
        report.skipped_edges = skipped_edges;

        let timestamp = match root.remove("timestamp") {
            Some(Value::String(ts)) => Some(ts),
            _ => None,
        };

        Ok((Self { nodes, edges, timestamp }, report))
    }

    /// Build a well-formed graph from this document.
    ///
    /// Duplicate node ids keep their first occurrence, and so does a second
    /// edge between the same pair. Edges whose source or target is not among
    /// the document's nodes are dropped, so the result never holds a dangling
    /// edge. An edge whose id is already held by a different pair is kept
    /// under a fresh id. Self-loops are kept.
    pub fn into_graph(self, report: &mut LoadReport) -> Graph {
        let mut graph = Graph::new();
        for node in self.nodes {
            if !graph.insert_node(node.into()) {
                report.duplicate_nodes += 1;
            }
        }
        for edge in self.edges {
            if !graph.contains_node(&edge.source) || !graph.contains_node(&edge.target) {
                report.dangling_edges.push(edge.id);
                continue;
            }
            if graph.edge_between(&edge.source, &edge.target).is_some() {
                report.duplicate_edges += 1;
                continue;
            }
            let mut edge = Edge::from(edge);
            if graph.contains_edge(&edge.id) {
                let id = graph.unused_edge_id(&edge.source, &edge.target);
                report.renamed_edges.push((edge.id, id.clone()));
                edge.id = id;
            }
            graph.insert_edge(edge);
        }
        graph
    }
}

/// Returns the decoded entries, whether the collection was missing, and how many entries were skipped.
fn decode_collection<T: for<'de> Deserialize<'de>>(value: Option<Value>) -> (Vec<T>, bool, usize) {
    let Some(Value::Array(items)) = value else {
        return (Vec::new(), true, 0);
    };
    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    let skipped = total - decoded.len();
    (decoded, false, skipped)
}

/// What had to be repaired while loading a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// `nodes` was absent or not an array
    pub missing_nodes: bool,
    /// `edges` was absent or not an array
    pub missing_edges: bool,
    /// Node entries that could not be decoded
    pub skipped_nodes: usize,
    /// Edge entries that could not be decoded
    pub skipped_edges: usize,
    /// Node entries whose id was already taken
    pub duplicate_nodes: usize,
    /// Edge entries repeating an already loaded source and target
    pub duplicate_edges: usize,
    /// Edges re-keyed because another pair held their id, as (old, new)
    pub renamed_edges: Vec<(EdgeId, EdgeId)>,
    /// Edges dropped because an endpoint was missing
    pub dangling_edges: Vec<EdgeId>,
}

impl LoadReport {
    /// Check if the document loaded without any repair
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Passthrough metadata carried by exported documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    /// Intended contract type
    pub contract_type: String,
    /// Intended target network
    pub network: String,
}

impl ExportMetadata {
    /// Create export metadata
    pub fn new(contract_type: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            contract_type: contract_type.into(),
            network: network.into(),
        }
    }
}

/// One-way export document. Never read back by a load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportDocument {
    /// Nodes
    pub nodes: Vec<NodeDocument>,
    /// Edges
    pub edges: Vec<EdgeDocument>,
    /// Export metadata
    pub metadata: ExportMetadata,
}

impl ExportDocument {
    /// Export document for `graph`
    pub fn from_graph(graph: &Graph, metadata: ExportMetadata) -> Self {
        let GraphDocument { nodes, edges, .. } = GraphDocument::from_graph(graph);
        Self { nodes, edges, metadata }
    }

    /// Encode as pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Palette item carried during a single drag-and-drop gesture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragPayload {
    /// Canvas node kind
    #[serde(rename = "type")]
    pub kind: String,
    /// Palette label
    pub label: String,
    /// Block type
    #[serde(rename = "nodeType")]
    pub node_type: String,
}

impl DragPayload {
    /// Payload for dragging `block` out of the palette
    pub fn for_block(block: &BlockDefinition) -> Self {
        Self {
            kind: node_kind(),
            label: block.name.clone(),
            node_type: block.id.clone(),
        }
    }

    /// Check whether this payload creates a block node
    pub fn is_block(&self) -> bool {
        self.kind == NODE_KIND
    }

    /// Encode for a transfer buffer
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from a transfer buffer
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BlockCatalog;
    use crate::graph::GraphStore;
    use crate::node::{ConfigValue, NodeData};

    fn sample_graph() -> Graph {
        let mut store = GraphStore::new();
        let a = store.add_node(
            "Deploy",
            Position::new(100.0, 100.0),
            NodeData::labelled("Deploy").with_description("mainnet deploy").with_config("gas", 3_i64),
        );
        let b = store.add_node("Constructor", Position::new(400.0, 100.0), NodeData::labelled("Init"));
        store.connect(&a.id, &b.id).unwrap();
        store.snapshot()
    }

    #[test]
    fn test_wire_shape() {
        let doc = GraphDocument::from_graph(&sample_graph()).with_timestamp("2024-05-01T12:00:00.000Z");
        let value = serde_json::to_value(&doc).unwrap();

        let node = &value["nodes"][0];
        assert_eq!(node["id"], "node_1");
        assert_eq!(node["type"], "customNode");
        assert_eq!(node["position"]["x"], 100.0);
        assert_eq!(node["data"]["type"], "Deploy");
        assert_eq!(node["data"]["status"], "idle");
        assert_eq!(node["data"]["description"], "mainnet deploy");
        assert_eq!(node["data"]["config"]["gas"], 3);
        assert_eq!(value["nodes"][1]["data"]["description"], "");

        let edge = &value["edges"][0];
        assert_eq!(edge["source"], "node_1");
        assert_eq!(edge["target"], "node_2");
        assert_eq!(value["timestamp"], "2024-05-01T12:00:00.000Z");
    }

    #[test]
    fn test_document_round_trip_preserves_graph() {
        let graph = sample_graph();
        let json = GraphDocument::from_graph(&graph).to_json_pretty().unwrap();
        let (doc, mut report) = GraphDocument::from_json(&json).unwrap();
        let loaded = doc.into_graph(&mut report);
        assert!(report.is_clean());
        assert_eq!(loaded, graph);
    }

    #[test]
    fn test_missing_collections_load_empty() {
        let (doc, mut report) = GraphDocument::from_json(r#"{"timestamp": "x"}"#).unwrap();
        assert!(report.missing_nodes && report.missing_edges);
        assert!(doc.into_graph(&mut report).is_empty());

        let json = r#"{"nodes": [{"id": "node_1", "data": {"label": "Lone"}}], "edges": "oops"}"#;
        let (doc, mut report) = GraphDocument::from_json(json).unwrap();
        let graph = doc.into_graph(&mut report);
        assert!(!report.missing_nodes);
        assert!(report.missing_edges);
        assert_eq!(graph.node_count(), 1);
        let node = graph.node(&NodeId::from("node_1")).unwrap();
        assert_eq!(node.status, NodeStatus::Idle);
        assert_eq!(node.position, Position::default());
    }

    #[test]
    fn test_not_an_object() {
        assert!(matches!(GraphDocument::from_json("[1, 2]"), Err(DocumentError::NotAnObject)));
        assert!(matches!(GraphDocument::from_json("{"), Err(DocumentError::Json(_))));
    }

    #[test]
    fn test_skips_undecodable_entries() {
        let json = r#"{"nodes": [{"id": "node_1"}, {"label": "no id"}, 7], "edges": [{"id": "e"}]}"#;
        let (doc, report) = GraphDocument::from_json(json).unwrap();
        assert_eq!(doc.nodes.len(), 1);
        assert_eq!(report.skipped_nodes, 2);
        assert_eq!(report.skipped_edges, 1);
    }

    #[test]
    fn test_dangling_edges_are_dropped() {
        let json = r#"{
            "nodes": [{"id": "node_1"}, {"id": "node_2"}],
            "edges": [
                {"id": "enode_1-node_2", "source": "node_1", "target": "node_2"},
                {"id": "enode_1-node_9", "source": "node_1", "target": "node_9"},
                {"id": "enode_2-node_2", "source": "node_2", "target": "node_2"}
            ]
        }"#;
        let (doc, mut report) = GraphDocument::from_json(json).unwrap();
        let graph = doc.into_graph(&mut report);

        assert_eq!(graph.edge_count(), 2);
        assert!(graph.is_consistent());
        assert_eq!(report.dangling_edges, vec![EdgeId::from("enode_1-node_9")]);
        assert!(graph.contains_edge(&EdgeId::from("enode_2-node_2")));
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let json = r#"{
            "nodes": [
                {"id": "node_1", "data": {"label": "first"}},
                {"id": "node_1", "data": {"label": "second"}}
            ],
            "edges": [
                {"id": "e1", "source": "node_1", "target": "node_1"},
                {"id": "e1", "source": "node_1", "target": "node_1"}
            ]
        }"#;
        let (doc, mut report) = GraphDocument::from_json(json).unwrap();
        let graph = doc.into_graph(&mut report);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.node(&NodeId::from("node_1")).unwrap().label, "first");
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(report.duplicate_nodes, 1);
        assert_eq!(report.duplicate_edges, 1);
    }

    #[test]
    fn test_shared_edge_id_between_different_pairs() {
        let json = r#"{
            "nodes": [{"id": "a"}, {"id": "b-c"}, {"id": "a-b"}, {"id": "c"}],
            "edges": [
                {"id": "ea-b-c", "source": "a-b", "target": "c"},
                {"id": "ea-b-c", "source": "a", "target": "b-c"},
                {"id": "other", "source": "a", "target": "b-c"}
            ]
        }"#;
        let (doc, mut report) = GraphDocument::from_json(json).unwrap();
        let graph = doc.into_graph(&mut report);

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(report.duplicate_edges, 1);
        let moved = graph.edge_between(&NodeId::from("a"), &NodeId::from("b-c")).unwrap();
        assert_eq!(moved.id.as_str(), "ea-b-c#1");
        assert_eq!(report.renamed_edges, vec![(EdgeId::from("ea-b-c"), moved.id.clone())]);
        assert_eq!(graph.edge(&EdgeId::from("ea-b-c")).unwrap().source.as_str(), "a-b");
    }

    #[test]
    fn test_export_document_shape() {
        let export = ExportDocument::from_graph(&sample_graph(), ExportMetadata::new("ERC20", "sepolia"));
        let value = serde_json::to_value(&export).unwrap();
        assert_eq!(value["metadata"]["contractType"], "ERC20");
        assert_eq!(value["metadata"]["network"], "sepolia");
        assert_eq!(value["nodes"].as_array().unwrap().len(), 2);
        assert!(value.get("timestamp").is_none());
    }

    #[test]
    fn test_drag_payload() {
        let catalog = BlockCatalog::default();
        let payload = DragPayload::for_block(catalog.get("Transfer").unwrap());
        let json = payload.to_json().unwrap();
        assert_eq!(json, r#"{"type":"customNode","label":"Transfer","nodeType":"Transfer"}"#);
        assert!(DragPayload::from_json(&json).unwrap().is_block());

        let foreign = DragPayload::from_json(r#"{"type":"group","label":"G","nodeType":"Group"}"#).unwrap();
        assert!(!foreign.is_block());
    }

    #[test]
    fn test_config_passthrough() {
        let json = r#"{"nodes": [{"id": "node_3", "data": {"type": "Oracle", "config": {"feed": {"pair": "ETH/USD", "decimals": 8}}}}]}"#;
        let (doc, mut report) = GraphDocument::from_json(json).unwrap();
        let graph = doc.into_graph(&mut report);
        let node = graph.node(&NodeId::from("node_3")).unwrap();
        let Some(ConfigValue::Map(feed)) = node.config.get("feed") else {
            panic!("feed should decode as a map");
        };
        assert_eq!(feed.get("pair"), Some(&ConfigValue::from("ETH/USD")));
        assert_eq!(feed.get("decimals"), Some(&ConfigValue::from(8_i64)));
    }
}
