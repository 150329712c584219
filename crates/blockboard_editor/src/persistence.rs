// SPDX-License-Identifier: MIT OR Apache-2.0
//! Persistence gateway: save, load and export of whole graphs.
//!
//! Save and export read a full copy of the graph. Load hands back a new
//! graph for the controller to swap in; it never touches a live store.

use crate::storage::{SlotStorage, StorageError};
use blockboard_graph::document::DocumentError;
use blockboard_graph::{ExportDocument, ExportMetadata, Graph, GraphDocument, LoadReport};
use chrono::{SecondsFormat, Utc};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Slot storage failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Slot content is not a graph document
    #[error("Unreadable document: {0}")]
    Document(#[from] DocumentError),

    /// Export file could not be written
    #[error("Export failed: {0}")]
    Io(#[from] std::io::Error),

    /// Export could not be encoded
    #[error("Export encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for persistence operations
pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Current wall-clock time as an ISO-8601 UTC string with millisecond precision
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Reads and writes graphs through slot storage
#[derive(Debug)]
pub struct PersistenceGateway<S> {
    storage: S,
    metadata: ExportMetadata,
}

impl<S: SlotStorage> PersistenceGateway<S> {
    /// Create a gateway over `storage`, exporting with `metadata`
    pub fn new(storage: S, metadata: ExportMetadata) -> Self {
        Self { storage, metadata }
    }

    /// The underlying storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Metadata attached to exports
    pub fn metadata(&self) -> &ExportMetadata {
        &self.metadata
    }

    /// Write `graph` to slot `key`, overwriting it. Returns the saved timestamp.
    pub fn save(&mut self, key: &str, graph: &Graph) -> Result<String> {
        let timestamp = timestamp_now();
        let json = GraphDocument::from_graph(graph)
            .with_timestamp(timestamp.clone())
            .to_json_pretty()?;
        self.storage.write(key, &json)?;

        tracing::info!(
            "Saved {} node(s) and {} edge(s) to slot {key:?}",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(timestamp)
    }

    /// Read slot `key`. `Ok(None)` when the slot is empty.
    ///
    /// Missing collections load as empty and dangling edges are dropped;
    /// both are logged rather than reported as failures.
    pub fn load(&self, key: &str) -> Result<Option<Graph>> {
        let Some(json) = self.storage.read(key)? else {
            tracing::info!("Slot {key:?} is empty");
            return Ok(None);
        };

        let (document, mut report) = GraphDocument::from_json(&json)?;
        let graph = document.into_graph(&mut report);
        log_repairs(key, &report);

        tracing::info!(
            "Loaded {} node(s) and {} edge(s) from slot {key:?}",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(Some(graph))
    }

    /// Build the one-way export document for `graph`
    pub fn export_document(&self, graph: &Graph) -> ExportDocument {
        ExportDocument::from_graph(graph, self.metadata.clone())
    }

    /// Write the export document for `graph` to `path` as pretty JSON
    pub fn export_to(&self, graph: &Graph, path: &Path) -> Result<()> {
        let document = self.export_document(graph);
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &document)?;
        writer.flush()?;

        tracing::info!("Exported {} node(s) to {:?}", document.nodes.len(), path);
        Ok(())
    }
}

fn log_repairs(key: &str, report: &LoadReport) {
    if report.is_clean() {
        return;
    }
    if report.missing_nodes {
        tracing::warn!("Slot {key:?} has no nodes array; loading none");
    }
    if report.missing_edges {
        tracing::warn!("Slot {key:?} has no edges array; loading none");
    }
    if report.skipped_nodes + report.skipped_edges > 0 {
        tracing::warn!(
            "Slot {key:?}: skipped {} node(s) and {} edge(s) that could not be decoded",
            report.skipped_nodes,
            report.skipped_edges
        );
    }
    if report.duplicate_nodes + report.duplicate_edges > 0 {
        tracing::warn!(
            "Slot {key:?}: ignored {} duplicate node id(s) and {} duplicate edge id(s)",
            report.duplicate_nodes,
            report.duplicate_edges
        );
    }
    for (old, new) in &report.renamed_edges {
        tracing::warn!("Slot {key:?}: edge id {old} was shared by another pair; loaded as {new}");
    }
    for edge in &report.dangling_edges {
        tracing::warn!("Slot {key:?}: dropped edge {edge} with a missing endpoint");
    }
}
