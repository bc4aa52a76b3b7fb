// src/dag/dispatch_step.rs

//! Result types for single dispatcher steps.

use crate::dag::node::ScheduledNode;
use crate::errors::DagflowError;
use crate::types::NodeId;

/// Structured result of one `dispatch` call.
///
/// Useful for tests that drive the dispatcher by hand and want to make
/// assertions about exactly what happened to each candidate.
#[derive(Debug, Default)]
pub struct DispatchStep {
    /// Nodes claimed by this call; the caller must hand them to a work service.
    pub launched: Vec<ScheduledNode>,
    /// Idle candidates whose parents have not all completed yet.
    pub not_ready: Vec<NodeId>,
    /// Candidates that were already processing or done.
    pub already_claimed: Vec<NodeId>,
    /// Candidates left untouched because dispatching is paused.
    pub deferred: Vec<NodeId>,
    /// Per-candidate failures (e.g. unknown ids). Siblings are unaffected.
    pub errors: Vec<DagflowError>,
}

impl DispatchStep {
    pub fn launched_ids(&self) -> Vec<NodeId> {
        self.launched.iter().map(|n| n.id.clone()).collect()
    }
}

/// Structured result of completing one node.
#[derive(Debug, Clone)]
pub struct CompletionStep {
    pub node: NodeId,
    /// Children for which this completion was the last outstanding parent.
    pub newly_ready: Vec<NodeId>,
}
