// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `dagflow`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dagflow",
    version,
    about = "Run a DAG of simulated work items in dependency order.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the graph definition (TOML).
    #[arg(
        long,
        value_name = "PATH",
        env = "DAGFLOW_CONFIG",
        default_value = "Dagflow.toml"
    )]
    pub config: String,

    /// Seed the run with this node (repeatable).
    ///
    /// Default: every root node of the graph.
    #[arg(long = "root", value_name = "ID")]
    pub roots: Vec<String>,

    /// Wall-clock length of one duration unit (e.g. `1s`, `100ms`).
    ///
    /// Overrides `[run].time_unit` from the config file.
    #[arg(long, value_name = "DURATION")]
    pub time_unit: Option<String>,

    /// How often progress is reported (e.g. `250ms`).
    ///
    /// Overrides `[run].observe_interval` from the config file.
    #[arg(long, value_name = "DURATION")]
    pub observe_interval: Option<String>,

    /// Do not log periodic progress.
    #[arg(long)]
    pub no_observe: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DAGFLOW_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the graph, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
