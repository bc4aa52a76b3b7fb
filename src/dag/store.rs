// src/dag/store.rs

//! Node store: the single source of truth for per-node run state.
//!
//! Topology is fixed when the store is built; only each node's status and
//! completed-parent counter change during a run. Every node carries its own
//! lock, so transitions on disjoint nodes never contend and there is no
//! global lock. Readers that walk the whole store (snapshots) lock nodes one
//! at a time and therefore see an eventually-consistent picture.

use std::collections::BTreeMap;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::dag::graph::DagGraph;
use crate::dag::node::{Claim, NodeSnapshot, NodeState, StatusCounts};
use crate::errors::{DagflowError, Result};
use crate::types::{NodeId, NodeStatus};

#[derive(Debug)]
struct NodeEntry {
    duration: Duration,
    is_root: bool,
    parents: Vec<NodeId>,
    children: Vec<NodeId>,
    state: Mutex<NodeState>,
}

impl NodeEntry {
    fn snapshot(&self, id: &str) -> NodeSnapshot {
        let state = *self.state.lock();
        NodeSnapshot {
            id: id.to_string(),
            status: state.status,
            duration: self.duration,
            is_root: self.is_root,
            completed_parents: state.completed_parents,
            total_parents: self.parents.len(),
        }
    }
}

#[derive(Debug)]
pub struct NodeStore {
    nodes: BTreeMap<NodeId, NodeEntry>,
}

impl NodeStore {
    /// Create a store with every node `Idle` and all counters at zero.
    pub fn new(graph: &DagGraph) -> Self {
        let nodes = graph
            .nodes()
            .map(|id| {
                let entry = NodeEntry {
                    duration: graph.duration_of(id).unwrap_or_default(),
                    is_root: graph.is_root(id),
                    parents: graph.parents_of(id).to_vec(),
                    children: graph.children_of(id).to_vec(),
                    state: Mutex::new(NodeState::new()),
                };
                (id.to_string(), entry)
            })
            .collect();

        Self { nodes }
    }

    fn entry(&self, id: &str) -> Result<&NodeEntry> {
        self.nodes
            .get(id)
            .ok_or_else(|| DagflowError::NotFound(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, e)| e.is_root)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn get(&self, id: &str) -> Result<NodeSnapshot> {
        Ok(self.entry(id)?.snapshot(id))
    }

    pub fn status(&self, id: &str) -> Result<NodeStatus> {
        Ok(self.entry(id)?.state.lock().status)
    }

    pub fn parents(&self, id: &str) -> Result<&[NodeId]> {
        Ok(self.entry(id)?.parents.as_slice())
    }

    pub fn children(&self, id: &str) -> Result<&[NodeId]> {
        Ok(self.entry(id)?.children.as_slice())
    }

    /// Unconditional `Idle -> Processing`.
    ///
    /// The dispatcher uses [`NodeStore::try_claim`] instead, which also checks
    /// readiness under the same lock.
    pub fn mark_processing(&self, id: &str) -> Result<()> {
        let entry = self.entry(id)?;
        let mut state = entry.state.lock();
        transition(id, &mut state, NodeStatus::Processing)
    }

    /// Atomically evaluate readiness and, if satisfied, move the node to
    /// `Processing`. At most one caller ever receives [`Claim::Claimed`] for a
    /// given node.
    pub fn try_claim(&self, id: &str) -> Result<Claim> {
        let entry = self.entry(id)?;
        let mut state = entry.state.lock();

        if state.status != NodeStatus::Idle {
            return Ok(Claim::AlreadyClaimed(state.status));
        }

        let total = entry.parents.len();
        if !entry.is_root && state.completed_parents != total {
            return Ok(Claim::NotReady {
                completed: state.completed_parents,
                total,
            });
        }

        transition(id, &mut state, NodeStatus::Processing)?;
        Ok(Claim::Claimed)
    }

    /// `Processing -> Done`.
    pub fn mark_done(&self, id: &str) -> Result<()> {
        let entry = self.entry(id)?;
        let mut state = entry.state.lock();
        transition(id, &mut state, NodeStatus::Done)
    }

    /// Atomically bump the completed-parent counter.
    ///
    /// Returns `(new_count, total_parents)` as observed under the lock, so
    /// exactly one caller sees `new_count == total_parents`.
    pub fn increment_completed_parents(&self, id: &str) -> Result<(usize, usize)> {
        let entry = self.entry(id)?;
        let total = entry.parents.len();
        let mut state = entry.state.lock();

        if state.completed_parents >= total {
            return Err(DagflowError::ParentCountOverflow {
                node: id.to_string(),
                total,
            });
        }

        state.completed_parents += 1;
        trace!(node = %id, completed = state.completed_parents, total, "parent completed");
        Ok((state.completed_parents, total))
    }

    /// Ordered `(node, status, duration)` view of every node.
    pub fn snapshot(&self) -> Vec<NodeSnapshot> {
        self.nodes
            .iter()
            .map(|(id, entry)| entry.snapshot(id))
            .collect()
    }

    /// All `(parent, child)` edges, ordered by parent then child.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.nodes
            .iter()
            .flat_map(|(id, entry)| {
                entry
                    .children
                    .iter()
                    .map(move |child| (id.clone(), child.clone()))
            })
            .collect()
    }

    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for entry in self.nodes.values() {
            match entry.state.lock().status {
                NodeStatus::Idle => counts.idle += 1,
                NodeStatus::Processing => counts.processing += 1,
                NodeStatus::Done => counts.done += 1,
            }
        }
        counts
    }

    /// Ids of nodes currently in `status`.
    pub fn ids_with_status(&self, status: NodeStatus) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, entry)| entry.state.lock().status == status)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Whether every node has reached `Done`.
    pub fn is_complete(&self) -> bool {
        self.nodes
            .values()
            .all(|entry| entry.state.lock().status == NodeStatus::Done)
    }
}

fn transition(id: &str, state: &mut NodeState, next: NodeStatus) -> Result<()> {
    if !state.status.can_transition_to(next) {
        return Err(DagflowError::InvalidTransition {
            node: id.to_string(),
            from: state.status,
            to: next,
        });
    }
    debug!(node = %id, from = %state.status, to = %next, "status transition");
    state.status = next;
    Ok(())
}
