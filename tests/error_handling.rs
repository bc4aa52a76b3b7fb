// tests/error_handling.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, NodeConfigBuilder};
use crate::common::fake_work::InstantWorkService;
use crate::common::{init_tracing, run_graph, with_timeout};

use std::io::Write;
use std::time::Duration;

use dagflow::config::{load_and_validate, ConfigFile};
use dagflow::dag::DagGraph;
use dagflow::engine::RunOutcome;
use dagflow::errors::DagflowError;
use dagflow::types::NodeStatus;
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_dag_cycle_returns_structured_error() {
    let file = config_file(
        r#"
[node.A]
duration = 1
after = ["B"]

[node.B]
duration = 1
after = ["A"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(DagflowError::CycleDetected(msg)) => {
            assert!(msg.contains("cycle detected"));
            assert!(msg.contains('A') || msg.contains('B'));
        }
        Err(e) => panic!("Expected CycleDetected, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unknown_dependency_is_not_found() {
    let file = config_file(
        r#"
[node.A]
duration = 1
after = ["NonExistent"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(DagflowError::NotFound(id)) => assert_eq!(id, "NonExistent"),
        Err(e) => panic!("Expected NotFound, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unknown_child_is_not_found() {
    let file = config_file(
        r#"
[node.A]
duration = 1
children = ["Ghost"]
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(DagflowError::NotFound(id)) if id == "Ghost"
    ));
}

#[test]
fn test_self_dependency_is_config_error() {
    let file = config_file(
        r#"
[node.A]
duration = 1
after = ["A"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(DagflowError::ConfigError(msg)) => assert!(msg.contains("cannot depend on itself")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_negative_duration_is_config_error() {
    let file = config_file(
        r#"
[node.A]
duration = -2.5
"#,
    );

    match load_and_validate(file.path()) {
        Err(DagflowError::ConfigError(msg)) => {
            assert!(msg.contains("'A'"));
            assert!(msg.contains("invalid duration"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_zero_time_unit_is_config_error() {
    let file = config_file(
        r#"
[run]
time_unit = "0s"

[node.A]
duration = 1
"#,
    );

    match load_and_validate(file.path()) {
        Err(DagflowError::ConfigError(msg)) => assert!(msg.contains("time_unit")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_bad_time_unit_suffix_is_config_error() {
    let file = config_file(
        r#"
[run]
time_unit = "3 days"

[node.A]
duration = 1
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(DagflowError::ConfigError(_))
    ));
}

#[test]
fn test_empty_config_is_config_error() {
    let file = config_file("[run]\ntime_unit = \"1s\"\n");

    match load_and_validate(file.path()) {
        Err(DagflowError::ConfigError(msg)) => assert!(msg.contains("at least one")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unknown_node_field_is_toml_error() {
    let file = config_file(
        r#"
[node.A]
duration = 1
cmd = "echo A"
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(DagflowError::TomlError(_))
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();

    assert!(matches!(
        load_and_validate(dir.path().join("missing.toml")),
        Err(DagflowError::IoError(_))
    ));
}

#[test]
fn test_builder_rejects_empty_graph() {
    assert!(matches!(
        DagGraph::builder().build(),
        Err(DagflowError::ConfigError(_))
    ));
}

#[tokio::test]
async fn test_unchecked_cycle_runs_to_a_stall() {
    init_tracing();

    let graph = DagGraph::builder()
        .node("a", Duration::from_secs(1))
        .node("b", Duration::from_secs(1))
        .edge("a", "b")
        .edge("b", "a")
        .build_unchecked()
        .unwrap();
    assert!(graph.roots().is_empty());
    assert!(matches!(
        graph.check_acyclic(),
        Err(DagflowError::CycleDetected(_))
    ));

    let work = InstantWorkService::new();
    let (report, store) = with_timeout(run_graph(&graph, work.clone()))
        .await
        .unwrap();

    assert_eq!(
        report.outcome,
        RunOutcome::Stalled {
            blocked: vec!["a".to_string(), "b".to_string()]
        }
    );
    assert!(work.started().is_empty());
    assert_eq!(store.status("a").unwrap(), NodeStatus::Idle);
    assert_eq!(store.status("b").unwrap(), NodeStatus::Idle);
}

#[test]
fn test_graph_without_roots_is_config_error() {
    let file = config_file(
        r#"
[node.A]
duration = 1
root = false

[node.B]
duration = 1
after = ["A"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(DagflowError::ConfigError(msg)) => assert!(msg.contains("no root")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_non_finite_duration_from_builder_is_config_error() {
    let raw = ConfigFileBuilder::new()
        .with_node("A", NodeConfigBuilder::new(f64::NAN).build())
        .raw();

    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(DagflowError::ConfigError(_))
    ));
}
