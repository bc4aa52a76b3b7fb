// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous "core runtime" that consumes
//! [`RuntimeEvent`]s and produces:
//! - updated dispatcher / in-flight state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from the channel
//! - handing `ScheduledNode`s to the work service
//! - timestamping starts and completions
//!
//! The core can be unit tested without channels, timers, or a work service.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use crate::dag::Dispatcher;
use crate::engine::event_handlers::{
    dispatch_candidates, handle_launch_failure, handle_node_completion, run_outcome, CoreCommand,
    CoreStep,
};
use crate::engine::RuntimeEvent;
use crate::types::NodeId;

/// Pure core runtime state.
///
/// This owns:
/// - a handle to the dispatcher (and through it, the node store)
/// - the set of nodes whose work is currently outstanding
#[derive(Debug)]
pub struct CoreRuntime {
    dispatcher: Arc<Dispatcher>,
    in_flight: BTreeSet<NodeId>,
}

impl CoreRuntime {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            in_flight: BTreeSet::new(),
        }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Nodes whose work has been launched but not yet reported finished.
    pub fn in_flight(&self) -> impl Iterator<Item = &str> {
        self.in_flight.iter().map(|s| s.as_str())
    }

    /// Seed the run with its root candidates.
    pub fn start(&mut self, roots: Vec<NodeId>) -> CoreStep {
        info!(?roots, "seeding run");
        let mut commands = Vec::new();

        if let Some(cmd) = dispatch_candidates(&self.dispatcher, &mut self.in_flight, roots) {
            commands.push(cmd);
        }

        self.finish_if_drained(commands)
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::NodeCompleted { node } => {
                let commands = handle_node_completion(&self.dispatcher, &mut self.in_flight, node);
                self.finish_if_drained(commands)
            }
            RuntimeEvent::LaunchFailed { node } => {
                handle_launch_failure(&mut self.in_flight, &node);
                self.finish_if_drained(Vec::new())
            }
            RuntimeEvent::PauseRequested => {
                info!(in_flight = self.in_flight.len(), "pause requested; draining in-flight work");
                self.dispatcher.pause_token().cancel();
                self.finish_if_drained(Vec::new())
            }
            RuntimeEvent::ShutdownRequested => {
                info!(in_flight = self.in_flight.len(), "shutdown requested");
                self.dispatcher.pause_token().cancel();
                let outcome = run_outcome(&self.dispatcher, &self.in_flight);
                CoreStep {
                    commands: vec![CoreCommand::Finish(outcome)],
                    keep_running: false,
                }
            }
        }
    }

    /// The run is over once no work is outstanding.
    fn finish_if_drained(&self, mut commands: Vec<CoreCommand>) -> CoreStep {
        if !self.in_flight.is_empty() {
            return CoreStep {
                commands,
                keep_running: true,
            };
        }

        let outcome = run_outcome(&self.dispatcher, &self.in_flight);
        commands.push(CoreCommand::Finish(outcome));
        CoreStep {
            commands,
            keep_running: false,
        }
    }
}
