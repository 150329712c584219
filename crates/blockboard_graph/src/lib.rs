// SPDX-License-Identifier: MIT OR Apache-2.0
//! Block graph model for Blockboard.
//!
//! This crate owns everything the whiteboard needs to describe a
//! smart-contract workflow without rendering it:
//! - The block catalog (palette metadata)
//! - Node and edge types with per-store identifier generation
//! - The graph store and its mutation operations
//! - Node selection
//! - The JSON document format used for save, load and export
//!
//! ## Invariants
//!
//! Every [`GraphStore`] operation leaves the graph well-formed on return:
//! node and edge ids are unique, and no edge points at a node that is not
//! in the graph. Deleting a node removes its incident edges in the same call.

pub mod catalog;
pub mod document;
pub mod edge;
pub mod graph;
pub mod id;
pub mod node;
pub mod selection;

pub use catalog::{BlockCatalog, BlockCategory, BlockDefinition};
pub use document::{DocumentError, DragPayload, ExportDocument, ExportMetadata, GraphDocument, LoadReport};
pub use edge::{Edge, EdgeId};
pub use graph::{DeleteReport, Graph, GraphError, GraphStore};
pub use id::{IdGenerator, NodeId};
pub use node::{ConfigValue, Node, NodeConfig, NodeData, NodePatch, NodeStatus, Position};
pub use selection::{SelectMode, Selection};
