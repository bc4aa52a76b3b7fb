// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [run]
/// time_unit = "1s"
/// observe_interval = "250ms"
///
/// [node.1]
/// duration = 1
/// children = ["2", "3"]
///
/// [node.4]
/// duration = 1
/// after = ["2", "3"]
/// ```
///
/// All sections are optional and have reasonable defaults, but validation
/// requires at least one node.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Run behaviour from `[run]`.
    #[serde(default)]
    pub run: RunSection,

    /// All nodes from `[node.<id>]`, keyed by node id.
    #[serde(default)]
    pub node: BTreeMap<String, NodeConfig>,
}

/// `[run]` section, as written.
#[derive(Debug, Clone, Deserialize)]
pub struct RunSection {
    /// Wall-clock length of one duration unit (e.g. `"1s"`, `"100ms"`).
    #[serde(default = "default_time_unit")]
    pub time_unit: String,

    /// How often the progress reporter polls the node store.
    #[serde(default = "default_observe_interval")]
    pub observe_interval: String,
}

fn default_time_unit() -> String {
    "1s".to_string()
}

fn default_observe_interval() -> String {
    "250ms".to_string()
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            time_unit: default_time_unit(),
            observe_interval: default_observe_interval(),
        }
    }
}

/// `[node.<id>]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    /// Simulated work length, in time units. Fractions are allowed.
    pub duration: f64,

    /// Parents: this node waits for all nodes listed here.
    #[serde(default)]
    pub after: Vec<String>,

    /// Children: nodes that wait on this one.
    ///
    /// Equivalent to listing this node in each child's `after`; both forms
    /// may be mixed and are merged.
    #[serde(default)]
    pub children: Vec<String>,

    /// Force root status. If `None`, a node is a root iff it has no parents.
    #[serde(default)]
    pub root: Option<bool>,
}

/// Validated `[run]` settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    pub time_unit: Duration,
    pub observe_interval: Duration,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            time_unit: Duration::from_secs(1),
            observe_interval: Duration::from_millis(250),
        }
    }
}

/// A validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>` (see
/// [`validate`](crate::config::validate)), so holding one means the node graph
/// it describes is known to build.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub run: RunSettings,
    pub node: BTreeMap<String, NodeConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(run: RunSettings, node: BTreeMap<String, NodeConfig>) -> Self {
        Self { run, node }
    }
}
