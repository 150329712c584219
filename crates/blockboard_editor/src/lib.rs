// SPDX-License-Identifier: MIT OR Apache-2.0
//! Blockboard editor.
//!
//! Sits between the canvas and the graph model:
//! - Interaction controller (palette drops, drags, connections, selection, keys)
//! - Confirmation gates for destructive gestures
//! - Storage slots and the persistence gateway
//! - Editor configuration
//! - The `blockboard` command line front end
//!
//! ## Architecture
//!
//! The controller is the only writer into a [`blockboard_graph::GraphStore`].
//! Rendering and persistence read copies of the graph; loading swaps a whole
//! new graph in through the controller.

pub mod cli;
pub mod config;
pub mod controller;
pub mod gate;
pub mod persistence;
pub mod projection;
pub mod storage;

pub use controller::{DropTarget, Gesture, InteractionController, Key};
pub use gate::{AlwaysConfirm, ConfirmationGate, PendingAction};
pub use persistence::PersistenceGateway;
pub use storage::{FileStorage, MemoryStorage, SlotStorage};
