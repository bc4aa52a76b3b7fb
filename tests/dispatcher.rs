// tests/dispatcher.rs

mod common;
use crate::common::builders::{diamond_graph, fan_in_demo_graph};

use std::sync::Arc;
use std::time::Duration;

use dagflow::dag::{DagGraph, Dispatcher, NodeStore};
use dagflow::errors::DagflowError;
use dagflow::types::NodeStatus;
use tokio_util::sync::CancellationToken;

fn dispatcher_for(graph: &DagGraph) -> Dispatcher {
    Dispatcher::new(Arc::new(NodeStore::new(graph)), CancellationToken::new())
}

#[test]
fn roots_are_launched_and_children_wait() {
    let dispatcher = dispatcher_for(&fan_in_demo_graph(Duration::from_secs(1)));

    let step = dispatcher.dispatch(["1", "2"]);
    assert_eq!(step.launched_ids(), vec!["1".to_string()]);
    assert_eq!(step.launched[0].duration, Duration::from_secs(1));
    assert_eq!(step.not_ready, vec!["2".to_string()]);
    assert!(step.errors.is_empty());

    assert_eq!(
        dispatcher.store().status("1").unwrap(),
        NodeStatus::Processing
    );
    assert_eq!(dispatcher.store().status("2").unwrap(), NodeStatus::Idle);
    assert_eq!(dispatcher.dispatched_count(), 1);
}

#[test]
fn redundant_dispatch_is_a_no_op() {
    let dispatcher = dispatcher_for(&diamond_graph(Duration::from_secs(1)));

    // Duplicates in one candidate set collapse.
    let step = dispatcher.dispatch(["top", "top", "top"]);
    assert_eq!(step.launched_ids(), vec!["top".to_string()]);
    assert!(step.already_claimed.is_empty());

    // Processing.
    let step = dispatcher.dispatch(["top"]);
    assert!(step.launched.is_empty());
    assert_eq!(step.already_claimed, vec!["top".to_string()]);

    // Done.
    dispatcher.complete("top").unwrap();
    let step = dispatcher.dispatch(["top"]);
    assert!(step.launched.is_empty());
    assert_eq!(step.already_claimed, vec!["top".to_string()]);
    assert_eq!(dispatcher.store().status("top").unwrap(), NodeStatus::Done);

    assert_eq!(dispatcher.dispatched_count(), 1);
}

#[test]
fn diamond_child_waits_for_both_parents_in_either_order() {
    for (first, second) in [("left", "right"), ("right", "left")] {
        let dispatcher = dispatcher_for(&diamond_graph(Duration::from_secs(1)));

        dispatcher.dispatch(["top"]);
        let step = dispatcher.complete("top").unwrap();
        let mut ready = step.newly_ready.clone();
        ready.sort();
        assert_eq!(ready, vec!["left".to_string(), "right".to_string()]);
        assert_eq!(dispatcher.dispatch(&step.newly_ready).launched.len(), 2);

        let step = dispatcher.complete(first).unwrap();
        assert!(step.newly_ready.is_empty(), "bottom freed after only {first}");
        // Even a forced candidate is not launched early.
        let forced = dispatcher.dispatch(["bottom"]);
        assert!(forced.launched.is_empty());
        assert_eq!(forced.not_ready, vec!["bottom".to_string()]);

        let step = dispatcher.complete(second).unwrap();
        assert_eq!(step.newly_ready, vec!["bottom".to_string()]);
        let launched = dispatcher.dispatch(&step.newly_ready);
        assert_eq!(launched.launched_ids(), vec!["bottom".to_string()]);

        let bottom = dispatcher.store().get("bottom").unwrap();
        assert_eq!(bottom.status, NodeStatus::Processing);
        assert_eq!(bottom.completed_parents, 2);
    }
}

#[test]
fn unknown_candidate_is_reported_without_aborting_siblings() {
    let dispatcher = dispatcher_for(&diamond_graph(Duration::from_secs(1)));

    let step = dispatcher.dispatch(["ghost", "top"]);
    assert_eq!(step.launched_ids(), vec!["top".to_string()]);
    assert_eq!(step.errors.len(), 1);
    match &step.errors[0] {
        DagflowError::NotFound(id) => assert_eq!(id, "ghost"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn completing_a_node_twice_does_not_double_count_children() {
    let dispatcher = dispatcher_for(&diamond_graph(Duration::from_secs(1)));

    dispatcher.dispatch(["top"]);
    dispatcher.complete("top").unwrap();
    dispatcher.dispatch(["left", "right"]);
    dispatcher.complete("left").unwrap();

    // A second completion of `left` must not stand in for `right`.
    assert!(matches!(
        dispatcher.complete("left"),
        Err(DagflowError::InvalidTransition { .. })
    ));
    let bottom = dispatcher.store().get("bottom").unwrap();
    assert_eq!(bottom.completed_parents, 1);
    assert!(dispatcher.dispatch(["bottom"]).launched.is_empty());
}

#[test]
fn completing_an_idle_node_is_rejected() {
    let dispatcher = dispatcher_for(&diamond_graph(Duration::from_secs(1)));

    assert!(matches!(
        dispatcher.complete("left"),
        Err(DagflowError::InvalidTransition {
            from: NodeStatus::Idle,
            ..
        })
    ));
    assert_eq!(dispatcher.store().get("bottom").unwrap().completed_parents, 0);
    assert_eq!(dispatcher.completed_count(), 0);
}

#[test]
fn paused_dispatcher_defers_candidates_but_accepts_completions() {
    let dispatcher = dispatcher_for(&diamond_graph(Duration::from_secs(1)));

    dispatcher.dispatch(["top"]);
    dispatcher.pause_token().cancel();
    assert!(dispatcher.is_paused());

    // In-flight work still completes.
    let step = dispatcher.complete("top").unwrap();
    assert_eq!(step.newly_ready.len(), 2);

    let step = dispatcher.dispatch(&step.newly_ready);
    assert!(step.launched.is_empty());
    assert_eq!(step.deferred.len(), 2);
    assert_eq!(dispatcher.store().status("left").unwrap(), NodeStatus::Idle);
    assert_eq!(dispatcher.store().status("right").unwrap(), NodeStatus::Idle);
}

#[test]
fn forced_root_child_is_not_relaunched_when_its_parent_completes() {
    let graph = DagGraph::builder()
        .node("a", Duration::from_secs(1))
        .node("b", Duration::from_secs(1))
        .edge("a", "b")
        .root("b", true)
        .build()
        .unwrap();
    let dispatcher = dispatcher_for(&graph);

    let step = dispatcher.dispatch(graph.roots());
    assert_eq!(step.launched.len(), 2);

    let step = dispatcher.complete("a").unwrap();
    assert_eq!(step.newly_ready, vec!["b".to_string()]);
    let step = dispatcher.dispatch(&step.newly_ready);
    assert!(step.launched.is_empty());
    assert_eq!(step.already_claimed, vec!["b".to_string()]);
    assert_eq!(dispatcher.dispatched_count(), 2);
}
