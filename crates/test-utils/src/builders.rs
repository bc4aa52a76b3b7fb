#![allow(dead_code)]

use std::collections::BTreeMap;
use std::time::Duration;

use dagflow::config::{ConfigFile, NodeConfig, RawConfigFile, RunSection};
use dagflow::dag::DagGraph;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                run: RunSection::default(),
                node: BTreeMap::new(),
            },
        }
    }

    pub fn with_node(mut self, id: &str, node: NodeConfig) -> Self {
        self.config.node.insert(id.to_string(), node);
        self
    }

    pub fn with_time_unit(mut self, unit: &str) -> Self {
        self.config.run.time_unit = unit.to_string();
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `NodeConfig`.
pub struct NodeConfigBuilder {
    node: NodeConfig,
}

impl NodeConfigBuilder {
    pub fn new(duration: f64) -> Self {
        Self {
            node: NodeConfig {
                duration,
                after: vec![],
                children: vec![],
                root: None,
            },
        }
    }

    pub fn after(mut self, parent: &str) -> Self {
        self.node.after.push(parent.to_string());
        self
    }

    pub fn child(mut self, child: &str) -> Self {
        self.node.children.push(child.to_string());
        self
    }

    pub fn root(mut self, val: bool) -> Self {
        self.node.root = Some(val);
        self
    }

    pub fn build(self) -> NodeConfig {
        self.node
    }
}

/// The six-node fan-in demo graph, durations in multiples of `unit`:
///
/// ```text
/// 1(1) -> 2(2), 3(5), 6(10)
/// 2, 3 -> 4(1)
/// 4, 6 -> 5(1)
/// ```
pub fn fan_in_demo_graph(unit: Duration) -> DagGraph {
    DagGraph::builder()
        .node("1", unit)
        .node("2", unit * 2)
        .node("3", unit * 5)
        .node("4", unit)
        .node("5", unit)
        .node("6", unit * 10)
        .edge("1", "2")
        .edge("1", "3")
        .edge("1", "6")
        .edge("2", "4")
        .edge("3", "4")
        .edge("4", "5")
        .edge("6", "5")
        .build()
        .expect("fan-in demo graph is valid")
}

/// `top -> left, right -> bottom`, all with the same duration.
pub fn diamond_graph(duration: Duration) -> DagGraph {
    DagGraph::builder()
        .node("top", duration)
        .node("left", duration)
        .node("right", duration)
        .node("bottom", duration)
        .edge("top", "left")
        .edge("top", "right")
        .edge("left", "bottom")
        .edge("right", "bottom")
        .build()
        .expect("diamond graph is valid")
}

/// `n0 -> n1 -> ... -> n{len-1}`.
pub fn chain_graph(len: usize, duration: Duration) -> DagGraph {
    let mut builder = DagGraph::builder();
    for i in 0..len {
        builder = builder.node(format!("n{i}"), duration);
        if i > 0 {
            builder = builder.edge(format!("n{}", i - 1), format!("n{i}"));
        }
    }
    builder.build().expect("chain graph is valid")
}
