// src/engine/report.rs

//! Summary of a finished run.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::types::NodeId;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every node reached `Done`.
    Completed,
    /// Dispatching was paused; in-flight work drained, these stayed idle.
    Paused { pending: Vec<NodeId> },
    /// Nothing left in flight but these nodes never finished (unknown seed
    /// roots, a dependency cycle, or a node that failed to launch).
    Stalled { blocked: Vec<NodeId> },
    /// Shut down while these nodes were still processing.
    Interrupted { in_flight: Vec<NodeId> },
}

/// Start/finish offsets of one node, relative to the run start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeTiming {
    pub started: Duration,
    pub finished: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Time from the seed dispatch until the runtime stopped.
    pub elapsed: Duration,
    /// Only nodes that were dispatched appear here.
    pub timeline: BTreeMap<NodeId, NodeTiming>,
    /// Number of nodes claimed by the dispatcher during this run.
    pub dispatched: usize,
}

impl RunReport {
    pub fn is_completed(&self) -> bool {
        self.outcome == RunOutcome::Completed
    }

    pub fn started_at(&self, node: &str) -> Option<Duration> {
        self.timeline.get(node).map(|t| t.started)
    }

    pub fn finished_at(&self, node: &str) -> Option<Duration> {
        self.timeline.get(node).and_then(|t| t.finished)
    }

    /// Node ids ordered by completion time (ties broken by id).
    pub fn completion_order(&self) -> Vec<NodeId> {
        let mut done: Vec<(Duration, &NodeId)> = self
            .timeline
            .iter()
            .filter_map(|(id, t)| t.finished.map(|f| (f, id)))
            .collect();
        done.sort();
        done.into_iter().map(|(_, id)| id.clone()).collect()
    }
}
