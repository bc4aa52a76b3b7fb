// tests/observe.rs

mod common;
use crate::common::builders::{diamond_graph, fan_in_demo_graph};
use crate::common::{init_tracing, with_timeout};

use std::sync::Arc;
use std::time::Duration;

use dagflow::dag::{Dispatcher, NodeStore};
use dagflow::observe::{spawn_reporter, GraphView, ProgressSummary};
use tokio_util::sync::CancellationToken;

#[test]
fn summary_counts_statuses_and_keeps_labels_in_id_order() {
    let store = NodeStore::new(&fan_in_demo_graph(Duration::from_secs(1)));
    let dispatcher = Dispatcher::new(Arc::new(store), CancellationToken::new());
    dispatcher.dispatch(["1"]);
    let step = dispatcher.complete("1").unwrap();
    dispatcher.dispatch(&step.newly_ready);

    let summary = ProgressSummary::from_snapshot(&dispatcher.store().snapshot());
    assert_eq!(summary.done, 1);
    assert_eq!(summary.processing, 3);
    assert_eq!(summary.idle, 2);
    assert_eq!(summary.total(), 6);
    assert_eq!(summary.to_string(), "1/6 done, 3 processing, 2 idle");
    assert_eq!(
        summary.labels,
        vec![
            "1 [1s, done]",
            "2 [2s, processing]",
            "3 [5s, processing]",
            "4 [1s, idle]",
            "5 [1s, idle]",
            "6 [10s, processing]",
        ]
    );
}

#[test]
fn graph_view_is_usable_as_a_trait_object() {
    let store: Arc<dyn GraphView> = Arc::new(NodeStore::new(&diamond_graph(Duration::from_secs(1))));

    assert_eq!(store.snapshot().len(), 4);
    assert_eq!(
        store.edges(),
        vec![
            ("left".to_string(), "bottom".to_string()),
            ("right".to_string(), "bottom".to_string()),
            ("top".to_string(), "left".to_string()),
            ("top".to_string(), "right".to_string()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn reporter_polls_until_cancelled_without_touching_state() {
    init_tracing();

    let store = Arc::new(NodeStore::new(&diamond_graph(Duration::from_secs(1))));
    let stop = CancellationToken::new();
    let handle = spawn_reporter(Arc::clone(&store), Duration::from_millis(100), stop.clone());

    tokio::time::sleep(Duration::from_millis(550)).await;
    store.mark_processing("top").unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    let seen = store.snapshot();

    stop.cancel();
    with_timeout(handle).await.unwrap();

    // Only the test's own transition is visible.
    assert_eq!(store.snapshot(), seen);
    assert_eq!(store.status_counts().processing, 1);
    assert_eq!(store.status_counts().idle, 3);
}
