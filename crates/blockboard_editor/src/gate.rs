// SPDX-License-Identifier: MIT OR Apache-2.0
//! Confirmation and prompt gates for gestures that need user input.
//!
//! Graph operations never prompt. The controller asks a gate first and only
//! calls into the store once the gate agrees.

use std::collections::VecDeque;

/// A destructive action waiting for confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    /// Delete the selected nodes
    DeleteSelection {
        /// Number of selected nodes
        nodes: usize,
    },
    /// Remove every node and edge
    ClearAll {
        /// Nodes in the graph
        nodes: usize,
        /// Edges in the graph
        edges: usize,
    },
}

impl PendingAction {
    /// Question shown to the user
    pub fn prompt(&self) -> String {
        match self {
            Self::DeleteSelection { nodes: 1 } => "Delete the selected block?".to_string(),
            Self::DeleteSelection { nodes } => format!("Delete {nodes} selected blocks?"),
            Self::ClearAll { nodes, edges } => {
                format!("Clear the whiteboard ({nodes} blocks, {edges} connections)?")
            }
        }
    }
}

/// Source of user answers
pub trait ConfirmationGate {
    /// Ask whether `action` may proceed
    fn confirm(&mut self, action: &PendingAction) -> bool;

    /// Ask for a new label. `None` means the prompt was dismissed.
    fn prompt_label(&mut self, current: &str) -> Option<String>;
}

/// Gate that approves everything and never supplies a label
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl ConfirmationGate for AlwaysConfirm {
    fn confirm(&mut self, _action: &PendingAction) -> bool {
        true
    }

    fn prompt_label(&mut self, _current: &str) -> Option<String> {
        None
    }
}

/// Gate that replays queued answers, declining once they run out
#[derive(Debug, Clone, Default)]
pub struct ScriptedGate {
    confirmations: VecDeque<bool>,
    labels: VecDeque<Option<String>>,
    /// Actions that were asked about, in order
    pub asked: Vec<PendingAction>,
}

impl ScriptedGate {
    /// Create a gate with no queued answers
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a confirmation answer
    pub fn answer(mut self, approve: bool) -> Self {
        self.confirmations.push_back(approve);
        self
    }

    /// Queue a label prompt answer
    pub fn label(mut self, label: Option<&str>) -> Self {
        self.labels.push_back(label.map(str::to_string));
        self
    }
}

impl ConfirmationGate for ScriptedGate {
    fn confirm(&mut self, action: &PendingAction) -> bool {
        self.asked.push(*action);
        self.confirmations.pop_front().unwrap_or(false)
    }

    fn prompt_label(&mut self, _current: &str) -> Option<String> {
        self.labels.pop_front().flatten()
    }
}

impl<G: ConfirmationGate + ?Sized> ConfirmationGate for &mut G {
    fn confirm(&mut self, action: &PendingAction) -> bool {
        (**self).confirm(action)
    }

    fn prompt_label(&mut self, current: &str) -> Option<String> {
        (**self).prompt_label(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts() {
        assert_eq!(
            PendingAction::DeleteSelection { nodes: 1 }.prompt(),
            "Delete the selected block?"
        );
        assert_eq!(
            PendingAction::DeleteSelection { nodes: 3 }.prompt(),
            "Delete 3 selected blocks?"
        );
        assert!(PendingAction::ClearAll { nodes: 2, edges: 1 }.prompt().contains("2 blocks"));
    }

    #[test]
    fn test_scripted_gate_runs_out() {
        let mut gate = ScriptedGate::new().answer(true).label(Some("Vault"));
        let action = PendingAction::ClearAll { nodes: 0, edges: 0 };
        assert!(gate.confirm(&action));
        assert!(!gate.confirm(&action));
        assert_eq!(gate.prompt_label("x"), Some("Vault".to_string()));
        assert_eq!(gate.prompt_label("x"), None);
        assert_eq!(gate.asked.len(), 2);
    }
}
