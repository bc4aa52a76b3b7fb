// src/config/validate.rs

use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::model::{ConfigFile, NodeConfig, RawConfigFile, RunSection, RunSettings};
use crate::dag::{DagGraph, GraphBuilder};
use crate::errors::{DagflowError, Result};
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = DagflowError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let run = validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(run, raw.node))
    }
}

impl ConfigFile {
    /// Build the node graph using the configured time unit.
    pub fn graph(&self) -> Result<DagGraph> {
        self.graph_with_unit(self.run.time_unit)
    }

    /// Build the node graph, scaling every node's `duration` by `time_unit`.
    pub fn graph_with_unit(&self, time_unit: Duration) -> Result<DagGraph> {
        graph_builder(&self.node, time_unit)?.build()
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<RunSettings> {
    ensure_has_nodes(cfg)?;
    let run = validate_run_section(&cfg.run)?;
    validate_node_durations(cfg)?;
    validate_dag(cfg, run.time_unit)?;
    Ok(run)
}

fn ensure_has_nodes(cfg: &RawConfigFile) -> Result<()> {
    if cfg.node.is_empty() {
        return Err(DagflowError::ConfigError(
            "config must contain at least one [node.<id>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_run_section(run: &RunSection) -> Result<RunSettings> {
    let time_unit = parse_setting("[run].time_unit", &run.time_unit)?;
    let observe_interval = parse_setting("[run].observe_interval", &run.observe_interval)?;

    Ok(RunSettings {
        time_unit,
        observe_interval,
    })
}

/// Parse a duration setting that must be strictly positive.
pub fn parse_setting(name: &str, value: &str) -> Result<Duration> {
    let parsed = parse_duration(value)
        .map_err(|e| DagflowError::ConfigError(format!("{}: {}", name, e)))?;
    if parsed.is_zero() {
        return Err(DagflowError::ConfigError(format!(
            "{} must be greater than zero (got '{}')",
            name, value
        )));
    }
    Ok(parsed)
}

fn validate_node_durations(cfg: &RawConfigFile) -> Result<()> {
    for (id, node) in cfg.node.iter() {
        if !node.duration.is_finite() || node.duration < 0.0 {
            return Err(DagflowError::ConfigError(format!(
                "node '{}' has invalid duration {} (must be a finite number >= 0)",
                id, node.duration
            )));
        }
    }
    Ok(())
}

fn validate_dag(cfg: &RawConfigFile, time_unit: Duration) -> Result<()> {
    // Building the graph checks references, self-edges and cycles.
    let graph = graph_builder(&cfg.node, time_unit)?.build()?;

    // Only reachable through `root = false` overrides.
    if graph.roots().is_empty() {
        return Err(DagflowError::ConfigError(
            "graph has no root node; nothing could ever start".to_string(),
        ));
    }
    Ok(())
}

fn graph_builder(nodes: &BTreeMap<String, NodeConfig>, time_unit: Duration) -> Result<GraphBuilder> {
    let mut builder = DagGraph::builder();

    for (id, node) in nodes.iter() {
        builder = builder.node(id.as_str(), scale_duration(id, node.duration, time_unit)?);
    }

    for (id, node) in nodes.iter() {
        for parent in node.after.iter() {
            builder = builder.edge(parent.as_str(), id.as_str());
        }
        for child in node.children.iter() {
            builder = builder.edge(id.as_str(), child.as_str());
        }
        if let Some(is_root) = node.root {
            builder = builder.root(id.as_str(), is_root);
        }
    }

    Ok(builder)
}

/// `units` time units as a `Duration`; fails instead of overflowing.
fn scale_duration(id: &str, units: f64, time_unit: Duration) -> Result<Duration> {
    Duration::try_from_secs_f64(time_unit.as_secs_f64() * units).map_err(|e| {
        DagflowError::ConfigError(format!(
            "node '{}' duration {} x {:?} is out of range: {}",
            id, units, time_unit, e
        ))
    })
}
