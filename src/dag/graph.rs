// src/dag/graph.rs

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::errors::{DagflowError, Result};
use crate::types::NodeId;

/// Internal node structure: stores immediate parents and children.
#[derive(Debug, Clone)]
struct DagNode {
    /// Nodes that must complete before this one can run.
    parents: Vec<NodeId>,
    /// Nodes that wait (partially) on this one.
    children: Vec<NodeId>,
    /// Length of the simulated work.
    duration: Duration,
    /// Explicit root override; `None` means "root iff no parents".
    root_override: Option<bool>,
}

impl DagNode {
    fn is_root(&self) -> bool {
        self.root_override.unwrap_or(self.parents.is_empty())
    }
}

/// Immutable topology of a run, keyed by node id.
///
/// Edges are only ever inserted as `(parent, child)` pairs that update both
/// sides, so parent/child lists are always symmetric. Iteration order is the
/// sorted id order.
#[derive(Debug, Clone)]
pub struct DagGraph {
    nodes: BTreeMap<NodeId, DagNode>,
}

impl DagGraph {
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    /// Return all node ids in sorted order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Immediate parents of a node.
    pub fn parents_of(&self, id: &str) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.parents.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate children of a node.
    pub fn children_of(&self, id: &str) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn duration_of(&self, id: &str) -> Option<Duration> {
        self.nodes.get(id).map(|n| n.duration)
    }

    pub fn is_root(&self, id: &str) -> bool {
        self.nodes.get(id).is_some_and(DagNode::is_root)
    }

    /// Nodes whose readiness ignores the parent count.
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.is_root())
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// All `(parent, child)` edges, ordered by parent then child.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.nodes
            .iter()
            .flat_map(|(id, node)| {
                node.children
                    .iter()
                    .map(move |child| (id.clone(), child.clone()))
            })
            .collect()
    }

    /// Fail with `CycleDetected` if the graph contains a directed cycle.
    pub fn check_acyclic(&self) -> Result<()> {
        self.topological_order().map(|_| ())
    }

    /// Earliest time at which every node can be done, assuming all roots
    /// start at time zero and unlimited parallelism.
    pub fn critical_path(&self) -> Result<Duration> {
        let order = self.topological_order()?;
        let mut finish: HashMap<&str, Duration> = HashMap::with_capacity(order.len());

        for id in order {
            let node = &self.nodes[id];
            let start = if node.is_root() {
                Duration::ZERO
            } else {
                node.parents
                    .iter()
                    .filter_map(|p| finish.get(p.as_str()).copied())
                    .max()
                    .unwrap_or(Duration::ZERO)
            };
            finish.insert(id, start + node.duration);
        }

        Ok(finish.into_values().max().unwrap_or(Duration::ZERO))
    }

    fn topological_order(&self) -> Result<Vec<&str>> {
        // Edge direction: parent -> child.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for id in self.nodes.keys() {
            graph.add_node(id.as_str());
        }

        for (id, node) in self.nodes.iter() {
            for child in node.children.iter() {
                graph.add_edge(id.as_str(), child.as_str(), ());
            }
        }

        toposort(&graph, None).map_err(|cycle| {
            DagflowError::CycleDetected(format!(
                "cycle detected in node DAG involving node '{}'",
                cycle.node_id()
            ))
        })
    }
}

/// Incremental constructor for a [`DagGraph`].
///
/// ```
/// use std::time::Duration;
/// use dagflow::dag::DagGraph;
///
/// let graph = DagGraph::builder()
///     .node("a", Duration::from_secs(1))
///     .node("b", Duration::from_secs(2))
///     .edge("a", "b")
///     .build()
///     .unwrap();
/// assert_eq!(graph.roots(), vec!["a".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: BTreeMap<NodeId, DagNode>,
    edges: Vec<(NodeId, NodeId)>,
    root_overrides: Vec<(NodeId, bool)>,
}

impl GraphBuilder {
    /// Declare a node. Declaring the same id twice replaces its duration.
    pub fn node(mut self, id: impl Into<NodeId>, duration: Duration) -> Self {
        let id = id.into();
        match self.nodes.get_mut(&id) {
            Some(existing) => existing.duration = duration,
            None => {
                self.nodes.insert(
                    id,
                    DagNode {
                        parents: Vec::new(),
                        children: Vec::new(),
                        duration,
                        root_override: None,
                    },
                );
            }
        }
        self
    }

    /// Declare that `child` waits on `parent`. Duplicate edges collapse.
    pub fn edge(mut self, parent: impl Into<NodeId>, child: impl Into<NodeId>) -> Self {
        self.edges.push((parent.into(), child.into()));
        self
    }

    /// Force (or forbid) root status regardless of the parent count.
    ///
    /// Unknown ids are reported by [`GraphBuilder::build`].
    pub fn root(mut self, id: impl Into<NodeId>, is_root: bool) -> Self {
        self.root_overrides.push((id.into(), is_root));
        self
    }

    /// Build and validate: references, self-edges and acyclicity.
    pub fn build(self) -> Result<DagGraph> {
        let graph = self.build_unchecked()?;
        graph.check_acyclic()?;
        Ok(graph)
    }

    /// Build without the cycle check.
    ///
    /// A cyclic graph built this way is legal to run; nodes on or behind the
    /// cycle simply never become ready.
    pub fn build_unchecked(mut self) -> Result<DagGraph> {
        if self.nodes.is_empty() {
            return Err(DagflowError::ConfigError(
                "graph must contain at least one node".to_string(),
            ));
        }

        for (parent, child) in std::mem::take(&mut self.edges) {
            for end in [&parent, &child] {
                if !self.nodes.contains_key(end) {
                    return Err(DagflowError::NotFound(end.clone()));
                }
            }
            if parent == child {
                return Err(DagflowError::ConfigError(format!(
                    "node '{}' cannot depend on itself",
                    parent
                )));
            }

            if let Some(parent_node) = self.nodes.get_mut(&parent) {
                if parent_node.children.contains(&child) {
                    debug!(%parent, %child, "duplicate edge ignored");
                    continue;
                }
                parent_node.children.push(child.clone());
            }
            if let Some(child_node) = self.nodes.get_mut(&child) {
                child_node.parents.push(parent);
            }
        }

        for (id, is_root) in self.root_overrides {
            match self.nodes.get_mut(&id) {
                Some(node) => node.root_override = Some(is_root),
                None => return Err(DagflowError::NotFound(id)),
            }
        }

        Ok(DagGraph { nodes: self.nodes })
    }
}
