// src/exec/service.rs

//! Pluggable work service abstraction.
//!
//! The runtime talks to a `WorkService` instead of sleeping itself. This makes
//! it easy to swap in a fake service in tests while keeping the production
//! implementation in [`timer`](super::timer).
//!
//! - `TimerWorkService` is the default implementation used by `dagflow`.
//! - Tests can provide their own `WorkService` that, for example, records
//!   which nodes were started and completes them on demand.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

use crate::dag::ScheduledNode;
use crate::engine::RuntimeEvent;
use crate::errors::{Error, Result};
use crate::types::NodeId;

/// Trait abstracting how a dispatched node's work is performed.
///
/// Contract:
/// - `run` is called once per dispatched node;
/// - the returned future resolves once the work has been *started*, it must
///   not wait for the work itself;
/// - the implementation completes `signal` exactly once, asynchronously, no
///   earlier than `node.duration` after the call.
pub trait WorkService: Send + Sync {
    fn run(
        &self,
        node: ScheduledNode,
        signal: CompletionSignal,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// One-shot completion handle for a single node.
///
/// `complete` consumes the signal, so a node can be reported finished at
/// most once.
#[derive(Debug)]
pub struct CompletionSignal {
    node: NodeId,
    tx: mpsc::Sender<RuntimeEvent>,
}

impl CompletionSignal {
    pub fn new(node: NodeId, tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self { node, tx }
    }

    /// Report the node's work as finished to the runtime.
    pub async fn complete(self) -> Result<()> {
        self.tx
            .send(RuntimeEvent::NodeCompleted { node: self.node })
            .await
            .map_err(Error::from)?;
        Ok(())
    }
}
