use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::dag::dispatch_step::{CompletionStep, DispatchStep};
use crate::dag::node::{Claim, ScheduledNode};
use crate::dag::store::NodeStore;
use crate::errors::Result;
use crate::types::NodeId;

/// Dispatcher decides which candidate nodes may start and propagates
/// completion to their children.
///
/// It is responsible for:
/// - skipping candidates that were already claimed or finished
/// - claiming ready nodes exactly once, even under concurrent callers
/// - counting parent completions on children
/// - reporting which children a completion made ready
///
/// All methods take `&self`; synchronisation lives in the [`NodeStore`].
#[derive(Debug)]
pub struct Dispatcher {
    store: Arc<NodeStore>,
    /// Once cancelled, no further node is claimed. Work already in flight is
    /// left alone.
    pause: CancellationToken,
    dispatched: AtomicUsize,
    completed: AtomicUsize,
}

impl Dispatcher {
    pub fn new(store: Arc<NodeStore>, pause: CancellationToken) -> Self {
        Self {
            store,
            pause,
            dispatched: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }

    pub fn store(&self) -> &Arc<NodeStore> {
        &self.store
    }

    pub fn pause_token(&self) -> &CancellationToken {
        &self.pause
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_cancelled()
    }

    /// Number of nodes claimed so far.
    pub fn dispatched_count(&self) -> usize {
        self.dispatched.load(Ordering::SeqCst)
    }

    /// Number of nodes completed so far.
    pub fn completed_count(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Evaluate each candidate once and claim the ready ones.
    ///
    /// Redundant candidates (duplicates, nodes already processing or done)
    /// are no-ops. An unknown id is reported in [`DispatchStep::errors`] and
    /// does not affect its siblings.
    pub fn dispatch<I, S>(&self, candidates: I) -> DispatchStep
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut step = DispatchStep::default();
        let mut seen: HashSet<NodeId> = HashSet::new();

        for candidate in candidates {
            let id = candidate.as_ref();
            if !seen.insert(id.to_string()) {
                continue;
            }

            if self.is_paused() {
                debug!(node = %id, "dispatch paused; deferring candidate");
                step.deferred.push(id.to_string());
                continue;
            }

            match self.store.try_claim(id) {
                Ok(Claim::Claimed) => {
                    let snapshot = match self.store.get(id) {
                        Ok(s) => s,
                        Err(err) => {
                            step.errors.push(err);
                            continue;
                        }
                    };
                    self.dispatched.fetch_add(1, Ordering::SeqCst);
                    info!(
                        node = %id,
                        duration_ms = snapshot.duration.as_millis() as u64,
                        "node ready; dispatching"
                    );
                    step.launched.push(ScheduledNode {
                        id: snapshot.id,
                        duration: snapshot.duration,
                    });
                }
                Ok(Claim::NotReady { completed, total }) => {
                    debug!(node = %id, completed, total, "node still waiting on parents");
                    step.not_ready.push(id.to_string());
                }
                Ok(Claim::AlreadyClaimed(status)) => {
                    debug!(node = %id, %status, "node already claimed; skipping");
                    step.already_claimed.push(id.to_string());
                }
                Err(err) => {
                    warn!(node = %id, error = %err, "cannot dispatch node");
                    step.errors.push(err);
                }
            }
        }

        step
    }

    /// Record that `id` finished its work.
    ///
    /// Marks the node `Done` and, only if that transition succeeded, counts
    /// the completion on every child. A child appears in
    /// [`CompletionStep::newly_ready`] exactly when this completion was its
    /// last outstanding parent, so a child reached through several parents
    /// is reported once.
    pub fn complete(&self, id: &str) -> Result<CompletionStep> {
        self.store.mark_done(id)?;
        self.completed.fetch_add(1, Ordering::SeqCst);
        info!(node = %id, "node done");

        let mut newly_ready = Vec::new();
        for child in self.store.children(id)? {
            match self.store.increment_completed_parents(child) {
                Ok((completed, total)) if completed == total => {
                    debug!(node = %id, child = %child, "last parent done; child is a candidate");
                    newly_ready.push(child.clone());
                }
                Ok((completed, total)) => {
                    debug!(node = %id, child = %child, completed, total, "child still waiting");
                }
                Err(err) => {
                    warn!(node = %id, child = %child, error = %err, "cannot count completion on child");
                }
            }
        }

        Ok(CompletionStep {
            node: id.to_string(),
            newly_ready,
        })
    }
}
