// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::collections::BTreeSet;

use tracing::{debug, error, info, warn};

use crate::dag::{Dispatcher, ScheduledNode};
use crate::engine::report::RunOutcome;
use crate::errors::DagflowError;
use crate::types::{NodeId, NodeStatus};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Hand these nodes to the work service.
    Launch(Vec<ScheduledNode>),
    /// The run is over.
    Finish(RunOutcome),
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

/// Dispatch `candidates` and turn whatever was claimed into a `Launch`.
///
/// Claimed nodes are recorded as in flight before the shell launches them.
pub fn dispatch_candidates(
    dispatcher: &Dispatcher,
    in_flight: &mut BTreeSet<NodeId>,
    candidates: Vec<NodeId>,
) -> Option<CoreCommand> {
    if candidates.is_empty() {
        return None;
    }

    let step = dispatcher.dispatch(&candidates);

    for err in &step.errors {
        warn!(error = %err, "candidate skipped");
    }
    if !step.deferred.is_empty() {
        info!(deferred = ?step.deferred, "dispatch paused; candidates not launched");
    }

    if step.launched.is_empty() {
        return None;
    }

    for node in &step.launched {
        in_flight.insert(node.id.clone());
    }
    Some(CoreCommand::Launch(step.launched))
}

/// Handle a node completion event.
pub fn handle_node_completion(
    dispatcher: &Dispatcher,
    in_flight: &mut BTreeSet<NodeId>,
    node: NodeId,
) -> Vec<CoreCommand> {
    let mut commands = Vec::new();

    if !in_flight.remove(&node) {
        warn!(node = %node, "completion for a node that is not in flight; ignoring");
        return commands;
    }

    match dispatcher.complete(&node) {
        Ok(step) => {
            if let Some(cmd) = dispatch_candidates(dispatcher, in_flight, step.newly_ready) {
                commands.push(cmd);
            }
        }
        Err(err @ DagflowError::InvalidTransition { .. }) => {
            // In-flight bookkeeping makes this unreachable unless the
            // dispatcher itself is broken.
            error!(node = %node, error = %err, "scheduling bug: node completed out of order");
            debug_assert!(false, "node '{node}' completed out of order: {err}");
        }
        Err(err) => {
            warn!(node = %node, error = %err, "cannot complete node");
        }
    }

    commands
}

/// Handle a node the work service could not start.
///
/// The node stays `Processing` and its descendants never become ready;
/// unrelated branches keep running.
pub fn handle_launch_failure(in_flight: &mut BTreeSet<NodeId>, node: &str) {
    if in_flight.remove(node) {
        warn!(node = %node, "node failed to launch; its descendants will not run");
    } else {
        warn!(node = %node, "launch failure for a node that is not in flight; ignoring");
    }
}

/// Compute how the run ended given the current store state.
pub fn run_outcome(dispatcher: &Dispatcher, in_flight: &BTreeSet<NodeId>) -> RunOutcome {
    let store = dispatcher.store();

    if !in_flight.is_empty() {
        return RunOutcome::Interrupted {
            in_flight: in_flight.iter().cloned().collect(),
        };
    }

    if store.is_complete() {
        return RunOutcome::Completed;
    }

    if dispatcher.is_paused() {
        return RunOutcome::Paused {
            pending: store.ids_with_status(NodeStatus::Idle),
        };
    }

    // Idle nodes plus any node whose launch failed.
    let blocked: Vec<NodeId> = store
        .snapshot()
        .into_iter()
        .filter(|n| n.status != NodeStatus::Done)
        .map(|n| n.id)
        .collect();
    debug!(?blocked, "no work in flight but nodes remain unfinished");
    RunOutcome::Stalled { blocked }
}
