// src/observe/reporter.rs

//! Periodic progress reporter.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::dag::NodeSnapshot;
use crate::observe::GraphView;
use crate::types::NodeStatus;

/// Aggregate view of one poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressSummary {
    pub idle: usize,
    pub processing: usize,
    pub done: usize,
    /// `label()` of every node, in id order.
    pub labels: Vec<String>,
}

impl ProgressSummary {
    pub fn from_snapshot(snapshot: &[NodeSnapshot]) -> Self {
        let mut summary = ProgressSummary::default();
        for node in snapshot {
            match node.status {
                NodeStatus::Idle => summary.idle += 1,
                NodeStatus::Processing => summary.processing += 1,
                NodeStatus::Done => summary.done += 1,
            }
            summary.labels.push(node.label());
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.idle + self.processing + self.done
    }
}

impl fmt::Display for ProgressSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} done, {} processing, {} idle",
            self.done,
            self.total(),
            self.processing,
            self.idle
        )
    }
}

/// Poll `view` every `interval` and log progress until `stop` is cancelled.
///
/// A line is only logged when something changed since the previous poll.
pub fn spawn_reporter<V>(view: Arc<V>, interval: Duration, stop: CancellationToken) -> JoinHandle<()>
where
    V: GraphView + ?Sized + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(edges = view.edges().len(), "progress reporter started");
        let mut last: Option<ProgressSummary> = None;

        loop {
            tokio::select! {
                _ = stop.cancelled() => break,
                _ = ticker.tick() => {
                    let summary = ProgressSummary::from_snapshot(&view.snapshot());
                    if last.as_ref() != Some(&summary) {
                        info!(nodes = ?summary.labels, "progress: {}", summary);
                        last = Some(summary);
                    }
                }
            }
        }

        debug!("progress reporter stopped");
    })
}
