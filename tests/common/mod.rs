#![allow(dead_code)]

#[allow(unused_imports)]
pub use dagflow_test_utils::builders;
#[allow(unused_imports)]
pub use dagflow_test_utils::fake_work;
#[allow(unused_imports)]
pub use dagflow_test_utils::{init_tracing, run_graph, test_run, with_timeout};

use std::time::Duration;

/// Assert that `actual` is `expected_secs` seconds, give or take a
/// millisecond of timer-wheel rounding.
pub fn assert_secs(actual: Option<Duration>, expected_secs: u64, what: &str) {
    let actual = actual.unwrap_or_else(|| panic!("{what}: no timestamp recorded"));
    let expected = Duration::from_secs(expected_secs);
    let diff = if actual > expected {
        actual - expected
    } else {
        expected - actual
    };
    assert!(
        diff <= Duration::from_millis(1),
        "{what}: expected {expected:?}, got {actual:?}"
    );
}
