// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the block graph.

use crate::id::NodeId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Position on the canvas, in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Position {
    /// Create a new position
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Return this position shifted by `(dx, dy)`
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Presentational run status of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// Not running
    #[default]
    Idle,
    /// Currently running
    Running,
    /// Finished successfully
    Success,
    /// Finished with an error
    Error,
}

impl NodeStatus {
    /// Wire name of this status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Value stored in a node's configuration bag.
///
/// The core never interprets these values; it only stores and copies them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// JSON `null`
    Null,
    /// Boolean
    Bool(bool),
    /// Number, kept exactly as written (integers stay integers)
    Number(serde_json::Number),
    /// String
    String(String),
    /// Ordered list
    List(Vec<ConfigValue>),
    /// Nested mapping
    Map(IndexMap<String, ConfigValue>),
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for ConfigValue {
    /// Non-finite values have no JSON form and become `Null`.
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for ConfigValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Per-node configuration bag
pub type NodeConfig = IndexMap<String, ConfigValue>;

/// A placed block instance
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Block type (catalog reference)
    pub type_id: String,
    /// Position on the canvas
    pub position: Position,
    /// Display label
    pub label: String,
    /// Optional description
    pub description: Option<String>,
    /// Run status
    pub status: NodeStatus,
    /// Opaque configuration
    pub config: NodeConfig,
}

impl Node {
    /// Build a node from its parts
    pub fn new(id: NodeId, type_id: impl Into<String>, position: Position, data: NodeData) -> Self {
        Self {
            id,
            type_id: type_id.into(),
            position,
            label: data.label,
            description: non_empty(data.description),
            status: data.status.unwrap_or_default(),
            config: data.config,
        }
    }

    /// Merge the fields present in `patch` into this node
    pub fn apply(&mut self, patch: NodePatch) {
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(type_id) = patch.type_id {
            self.type_id = type_id;
        }
        if let Some(description) = patch.description {
            self.description = non_empty(Some(description));
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(config) = patch.config {
            self.config.extend(config);
        }
    }
}

/// Initial data for a new node.
#[derive(Debug, Clone, Default)]
pub struct NodeData {
    /// Display label
    pub label: String,
    /// Optional description
    pub description: Option<String>,
    /// Initial status, `idle` when unset
    pub status: Option<NodeStatus>,
    /// Initial configuration
    pub config: NodeConfig,
}

impl NodeData {
    /// Data with just a label
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the initial status
    pub fn with_status(mut self, status: NodeStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Add a configuration entry
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }
}

/// Partial update for an existing node. `None` fields are left untouched.
///
/// An empty `description` clears it. `config` entries are merged key by key.
#[derive(Debug, Clone, Default)]
pub struct NodePatch {
    /// New label
    pub label: Option<String>,
    /// New block type
    pub type_id: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New status
    pub status: Option<NodeStatus>,
    /// New position
    pub position: Option<Position>,
    /// Configuration entries to merge
    pub config: Option<NodeConfig>,
}

impl NodePatch {
    /// Patch that only changes the label
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    /// Patch that only changes the status
    pub fn status(status: NodeStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
