// src/dag/node.rs

//! Per-node state and the read-only views handed out by the store.

use std::time::Duration;

use crate::types::{NodeId, NodeStatus};

/// Mutable per-node state. Only ever touched under the node's own lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeState {
    pub(crate) status: NodeStatus,
    pub(crate) completed_parents: usize,
}

impl NodeState {
    pub(crate) fn new() -> Self {
        Self {
            status: NodeStatus::Idle,
            completed_parents: 0,
        }
    }
}

/// Point-in-time copy of one node, as seen by observers and callers of
/// [`NodeStore::get`](crate::dag::NodeStore::get).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub status: NodeStatus,
    pub duration: Duration,
    pub is_root: bool,
    pub completed_parents: usize,
    pub total_parents: usize,
}

impl NodeSnapshot {
    /// Readiness predicate: root, or every parent observed as done.
    pub fn is_ready(&self) -> bool {
        self.is_root || self.completed_parents == self.total_parents
    }

    /// Short progress label, e.g. `4 [1s, processing]`.
    pub fn label(&self) -> String {
        format!(
            "{} [{}s, {}]",
            self.id,
            self.duration.as_secs_f64(),
            self.status
        )
    }
}

/// Outcome of an atomic readiness-check-and-claim attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The node moved `Idle -> Processing`; the caller owns its dispatch.
    Claimed,
    /// The node is still waiting on parents.
    NotReady { completed: usize, total: usize },
    /// Someone else already claimed (or finished) it.
    AlreadyClaimed(NodeStatus),
}

/// Description of a node the dispatcher wants the work service to run now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledNode {
    pub id: NodeId,
    pub duration: Duration,
}

/// Counts of nodes per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub idle: usize,
    pub processing: usize,
    pub done: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.idle + self.processing + self.done
    }
}
