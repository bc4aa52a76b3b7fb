use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dagflow::config::ConfigFile;
use dagflow::dag::{Dispatcher, NodeStore};
use dagflow::types::NodeStatus;
use dagflow_test_utils::builders::{ConfigFileBuilder, NodeConfigBuilder};
use proptest::prelude::*;
use tokio_util::sync::CancellationToken;

// Strategy to generate a valid DAG configuration.
// Acyclic by construction: node N may only depend on nodes 0..N-1.
fn dag_config_strategy(max_nodes: usize) -> impl Strategy<Value = ConfigFile> {
    (1..=max_nodes).prop_flat_map(|num_nodes| {
        let deps_strat = proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_nodes),
            num_nodes,
        );

        deps_strat.prop_map(move |raw_deps| {
            let mut builder = ConfigFileBuilder::new();
            for (i, potential_deps) in raw_deps.into_iter().enumerate() {
                let name = format!("node_{:02}", i);
                let mut node_builder = NodeConfigBuilder::new(1.0);

                let valid_deps: HashSet<usize> = if i == 0 {
                    HashSet::new()
                } else {
                    potential_deps.into_iter().map(|d| d % i).collect()
                };
                for dep_idx in valid_deps {
                    node_builder = node_builder.after(&format!("node_{:02}", dep_idx));
                }
                builder = builder.with_node(&name, node_builder.build());
            }
            builder.build()
        })
    })
}

proptest! {
    #[test]
    fn every_node_runs_once_and_only_after_its_parents(
        cfg in dag_config_strategy(12),
        picks in proptest::collection::vec(any::<usize>(), 64),
        redundant in proptest::collection::vec(any::<usize>(), 0..8),
    ) {
        let graph = cfg.graph().unwrap();
        let store = Arc::new(NodeStore::new(&graph));
        let dispatcher = Dispatcher::new(Arc::clone(&store), CancellationToken::new());
        let ids: Vec<String> = store.ids().map(str::to_string).collect();

        let mut launches: HashMap<String, usize> = HashMap::new();
        let mut executing: Vec<String> = Vec::new();

        let mut record = |launched: Vec<String>, executing: &mut Vec<String>| -> Result<(), TestCaseError> {
            for id in launched {
                for parent in store.parents(&id).unwrap() {
                    prop_assert_eq!(
                        store.status(parent).unwrap(),
                        NodeStatus::Done,
                        "{} launched before parent {}", id, parent
                    );
                }
                *launches.entry(id.clone()).or_default() += 1;
                executing.push(id);
            }
            Ok(())
        };

        record(dispatcher.dispatch(graph.roots()).launched_ids(), &mut executing)?;

        let mut step = 0;
        while !executing.is_empty() {
            let pick = picks[step % picks.len()] % executing.len();
            let node = executing.swap_remove(pick);
            let completion = dispatcher.complete(&node).unwrap();
            record(dispatcher.dispatch(&completion.newly_ready).launched_ids(), &mut executing)?;

            // Throwing arbitrary extra candidates at the dispatcher must not
            // launch anything that is not ready or already claimed.
            if let Some(&r) = redundant.get(step) {
                let extra = &ids[r % ids.len()];
                record(dispatcher.dispatch([extra]).launched_ids(), &mut executing)?;
            }
            step += 1;
        }

        prop_assert!(store.is_complete());
        prop_assert_eq!(launches.len(), ids.len());
        for (id, count) in &launches {
            prop_assert_eq!(*count, 1, "{} launched {} times", id, count);
        }
        for node in store.snapshot() {
            prop_assert_eq!(node.completed_parents, node.total_parents);
        }
        prop_assert_eq!(dispatcher.dispatched_count(), ids.len());
    }
}
