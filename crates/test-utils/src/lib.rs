pub mod builders;
pub mod fake_work;

use std::sync::{Arc, Once};

use dagflow::dag::{DagGraph, Dispatcher, NodeStore};
use dagflow::engine::{CoreRuntime, RunReport, Runtime, RuntimeEvent};
use dagflow::exec::WorkService;
use dagflow::types::NodeId;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Everything a test needs to drive one run by hand.
pub struct TestRun<W: WorkService> {
    pub store: Arc<NodeStore>,
    pub dispatcher: Arc<Dispatcher>,
    pub events: mpsc::Sender<RuntimeEvent>,
    pub runtime: Runtime<W>,
}

/// Wire a store, dispatcher and runtime around `graph` and `work`.
pub fn test_run<W: WorkService>(graph: &DagGraph, work: W) -> TestRun<W> {
    let store = Arc::new(NodeStore::new(graph));
    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&store), CancellationToken::new()));
    let (tx, rx) = mpsc::channel::<RuntimeEvent>(64);
    let runtime = Runtime::new(CoreRuntime::new(Arc::clone(&dispatcher)), tx.clone(), rx, work);

    TestRun {
        store,
        dispatcher,
        events: tx,
        runtime,
    }
}

/// Run `graph` from its roots to the end and return the report plus store.
pub async fn run_graph<W: WorkService>(
    graph: &DagGraph,
    work: W,
) -> dagflow::errors::Result<(RunReport, Arc<NodeStore>)> {
    let roots: Vec<NodeId> = graph.roots();
    let run = test_run(graph, work);
    let report = run.runtime.run(roots).await?;
    Ok((report, run.store))
}
