use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use dagflow::dag::ScheduledNode;
use dagflow::errors::{DagflowError, Result};
use dagflow::exec::{CompletionSignal, WorkService};
use dagflow::types::NodeId;

/// A fake work service that:
/// - records which nodes were started
/// - reports each one finished straight away, ignoring its duration.
#[derive(Clone, Default)]
pub struct InstantWorkService {
    started: Arc<Mutex<Vec<NodeId>>>,
}

impl InstantWorkService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started(&self) -> Vec<NodeId> {
        self.started.lock().unwrap().clone()
    }
}

impl WorkService for InstantWorkService {
    fn run(
        &self,
        node: ScheduledNode,
        signal: CompletionSignal,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let started = Arc::clone(&self.started);

        Box::pin(async move {
            started.lock().unwrap().push(node.id.clone());
            tokio::spawn(async move {
                let _ = signal.complete().await;
            });
            Ok(())
        })
    }
}

/// A fake work service whose nodes only finish when the test says so.
#[derive(Clone, Default)]
pub struct ManualWorkService {
    started: Arc<Mutex<Vec<NodeId>>>,
    pending: Arc<Mutex<HashMap<NodeId, CompletionSignal>>>,
}

impl ManualWorkService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started(&self) -> Vec<NodeId> {
        self.started.lock().unwrap().clone()
    }

    /// Nodes started but not yet released, sorted.
    pub fn pending(&self) -> Vec<NodeId> {
        let mut ids: Vec<_> = self.pending.lock().unwrap().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Complete `node`'s work. Returns `false` if it was not pending.
    pub async fn release(&self, node: &str) -> bool {
        let signal = self.pending.lock().unwrap().remove(node);
        match signal {
            Some(signal) => signal.complete().await.is_ok(),
            None => false,
        }
    }
}

impl WorkService for ManualWorkService {
    fn run(
        &self,
        node: ScheduledNode,
        signal: CompletionSignal,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let started = Arc::clone(&self.started);
        let pending = Arc::clone(&self.pending);

        Box::pin(async move {
            started.lock().unwrap().push(node.id.clone());
            pending.lock().unwrap().insert(node.id, signal);
            Ok(())
        })
    }
}

/// Like [`InstantWorkService`], but refuses to start the listed nodes.
#[derive(Clone, Default)]
pub struct RefusingWorkService {
    refuse: Arc<Vec<NodeId>>,
    inner: InstantWorkService,
}

impl RefusingWorkService {
    pub fn new(refuse: &[&str]) -> Self {
        Self {
            refuse: Arc::new(refuse.iter().map(|s| s.to_string()).collect()),
            inner: InstantWorkService::new(),
        }
    }

    /// Nodes that were actually started.
    pub fn started(&self) -> Vec<NodeId> {
        self.inner.started()
    }
}

impl WorkService for RefusingWorkService {
    fn run(
        &self,
        node: ScheduledNode,
        signal: CompletionSignal,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        if self.refuse.contains(&node.id) {
            let id = node.id;
            return Box::pin(async move {
                Err(DagflowError::Other(anyhow::anyhow!("refusing to start '{id}'")))
            });
        }
        self.inner.run(node, signal)
    }
}
