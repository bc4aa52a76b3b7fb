// src/engine/runtime.rs

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::dag::ScheduledNode;
use crate::errors::Result;
use crate::exec::{CompletionSignal, WorkService};
use crate::types::NodeId;

use super::core::CoreRuntime;
use super::report::{NodeTiming, RunOutcome, RunReport};
use super::{CoreCommand, CoreStep, RuntimeEvent};

/// Drives the dispatcher in response to `RuntimeEvent`s and delegates the
/// actual work to a `WorkService`.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// runtime semantics. This struct handles async IO: reading events from the
/// channel, launching work and timestamping progress.
pub struct Runtime<W: WorkService> {
    core: CoreRuntime,
    event_tx: mpsc::Sender<RuntimeEvent>,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    work: W,
    started: Instant,
    timeline: BTreeMap<NodeId, NodeTiming>,
}

impl<W: WorkService> fmt::Debug for Runtime<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<W: WorkService> Runtime<W> {
    /// `event_tx` must feed `event_rx`; it is handed to every
    /// [`CompletionSignal`] so work can report back.
    pub fn new(
        core: CoreRuntime,
        event_tx: mpsc::Sender<RuntimeEvent>,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        work: W,
    ) -> Self {
        Self {
            core,
            event_tx,
            event_rx,
            work,
            started: Instant::now(),
            timeline: BTreeMap::new(),
        }
    }

    /// Seed the run with `roots` and process events until no work remains.
    ///
    /// - Consumes `RuntimeEvent`s from `event_rx`.
    /// - Feeds them into the core runtime.
    /// - Executes commands returned by the core (launch work, finish).
    pub async fn run(mut self, roots: Vec<NodeId>) -> Result<RunReport> {
        info!("dagflow runtime started");
        self.started = Instant::now();

        let step = self.core.start(roots);
        if let Some(outcome) = self.execute_step(step).await {
            return Ok(self.into_report(outcome));
        }

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            if let RuntimeEvent::NodeCompleted { node } = &event {
                let at = self.started.elapsed();
                if let Some(timing) = self.timeline.get_mut(node) {
                    timing.finished.get_or_insert(at);
                }
            }

            let step = self.core.step(event);
            if let Some(outcome) = self.execute_step(step).await {
                return Ok(self.into_report(outcome));
            }
        }

        let in_flight: Vec<NodeId> = self.core.in_flight().map(str::to_string).collect();
        Ok(self.into_report(RunOutcome::Interrupted { in_flight }))
    }

    /// Execute the commands of one core step; returns the outcome once the
    /// core says to stop.
    ///
    /// Launch failures are fed straight back into the core, which may
    /// produce further steps.
    async fn execute_step(&mut self, step: CoreStep) -> Option<RunOutcome> {
        let mut steps = VecDeque::from([step]);
        let mut outcome = None;

        while let Some(step) = steps.pop_front() {
            for command in step.commands {
                match command {
                    CoreCommand::Launch(nodes) => {
                        for node in self.launch(nodes).await {
                            steps.push_back(self.core.step(RuntimeEvent::LaunchFailed { node }));
                        }
                    }
                    CoreCommand::Finish(o) => outcome = Some(o),
                }
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                // keep_running=false is always accompanied by Finish.
                return outcome.or(Some(RunOutcome::Interrupted {
                    in_flight: Vec::new(),
                }));
            }
        }

        None
    }

    /// Hand `nodes` to the work service; returns the ids it refused.
    async fn launch(&mut self, nodes: Vec<ScheduledNode>) -> Vec<NodeId> {
        let ids: Vec<_> = nodes.iter().map(|n| n.id.as_str()).collect();
        debug!(?ids, "launching work");

        let at = self.started.elapsed();
        let mut failed = Vec::new();
        for node in nodes {
            let id = node.id.clone();
            self.timeline.insert(
                id.clone(),
                NodeTiming {
                    started: at,
                    finished: None,
                },
            );
            let signal = CompletionSignal::new(id.clone(), self.event_tx.clone());
            if let Err(err) = self.work.run(node, signal).await {
                warn!(node = %id, error = %err, "work service failed to start node");
                failed.push(id);
            }
        }
        failed
    }

    fn into_report(self, outcome: RunOutcome) -> RunReport {
        let elapsed = self.started.elapsed();
        let dispatched = self.core.dispatcher().dispatched_count();
        info!(?outcome, elapsed_ms = elapsed.as_millis() as u64, dispatched, "runtime exiting");

        RunReport {
            outcome,
            elapsed,
            timeline: self.timeline,
            dispatched,
        }
    }
}
