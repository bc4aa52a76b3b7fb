// src/observe/mod.rs

//! Read-only progress observation.
//!
//! Observers poll a [`GraphView`] at a fixed cadence and never mutate state.
//! The node store implements it directly; its snapshots lock one node at a
//! time, so a poll never blocks dispatch for longer than a single node's
//! transition.

pub mod reporter;

use crate::dag::{NodeSnapshot, NodeStore};
use crate::types::NodeId;

pub use reporter::{ProgressSummary, spawn_reporter};

/// What an observer is allowed to see.
pub trait GraphView: Send + Sync {
    /// Every node, ordered by id.
    fn snapshot(&self) -> Vec<NodeSnapshot>;
    /// Every `(parent, child)` edge.
    fn edges(&self) -> Vec<(NodeId, NodeId)>;
}

impl GraphView for NodeStore {
    fn snapshot(&self) -> Vec<NodeSnapshot> {
        NodeStore::snapshot(self)
    }

    fn edges(&self) -> Vec<(NodeId, NodeId)> {
        NodeStore::edges(self)
    }
}
