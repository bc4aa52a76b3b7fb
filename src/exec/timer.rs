// src/exec/timer.rs

//! Timer-backed work service: a node's "work" is sleeping for its duration.

use std::future::Future;
use std::pin::Pin;

use tracing::{debug, error};

use crate::dag::ScheduledNode;
use crate::errors::Result;
use crate::exec::service::{CompletionSignal, WorkService};

/// Production work service.
///
/// Each node runs in its own Tokio task, so any number of nodes may be in
/// flight at once. Works with both the real clock and Tokio's paused test
/// clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimerWorkService;

impl WorkService for TimerWorkService {
    fn run(
        &self,
        node: ScheduledNode,
        signal: CompletionSignal,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            tokio::spawn(async move {
                debug!(node = %node.id, duration_ms = node.duration.as_millis() as u64, "work started");
                tokio::time::sleep(node.duration).await;
                debug!(node = %node.id, "work finished");

                if let Err(err) = signal.complete().await {
                    error!(node = %node.id, error = %err, "failed to report completion to runtime");
                }
            });
            Ok(())
        })
    }
}
