// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod observe;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{load_and_validate, parse_setting};
use crate::dag::{DagGraph, Dispatcher, NodeStore};
use crate::engine::{CoreRuntime, RunOutcome, RunReport, Runtime, RuntimeEvent};
use crate::exec::TimerWorkService;
use crate::types::in_units;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - node store / dispatcher / runtime
/// - timer work service
/// - (optional) progress reporter
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;

    let time_unit = match args.time_unit.as_deref() {
        Some(s) => parse_setting("--time-unit", s)?,
        None => cfg.run.time_unit,
    };
    let observe_interval = match args.observe_interval.as_deref() {
        Some(s) => parse_setting("--observe-interval", s)?,
        None => cfg.run.observe_interval,
    };

    let graph = cfg.graph_with_unit(time_unit)?;

    if args.dry_run {
        print_dry_run(&graph, time_unit)?;
        return Ok(());
    }

    let roots = if args.roots.is_empty() {
        graph.roots()
    } else {
        args.roots.clone()
    };
    info!(?roots, "initial candidates for this run");

    // Node store + dispatcher, owned by this run.
    let store = Arc::new(NodeStore::new(&graph));
    let pause = CancellationToken::new();
    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&store), pause));

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    // Optional progress reporter.
    let stop_reporter = CancellationToken::new();
    let reporter = if args.no_observe {
        None
    } else {
        Some(observe::spawn_reporter(
            Arc::clone(&store),
            observe_interval,
            stop_reporter.clone(),
        ))
    };

    let core = CoreRuntime::new(dispatcher);
    let runtime = Runtime::new(core, rt_tx, rt_rx, TimerWorkService);
    let report = runtime.run(roots).await?;

    stop_reporter.cancel();
    if let Some(handle) = reporter {
        if let Err(e) = handle.await {
            warn!(error = %e, "progress reporter task failed");
        }
    }

    print_report(&report, time_unit);

    match &report.outcome {
        RunOutcome::Completed => Ok(()),
        RunOutcome::Stalled { blocked } => {
            bail!("run stalled; unfinished nodes: {blocked:?}")
        }
        RunOutcome::Paused { pending } => {
            warn!(?pending, "run paused before completion");
            Ok(())
        }
        RunOutcome::Interrupted { in_flight } => {
            warn!(?in_flight, "run interrupted");
            Ok(())
        }
    }
}

/// Print per-node completion times (in units) and the outcome.
fn print_report(report: &RunReport, time_unit: Duration) {
    println!("dagflow run report");
    println!("  outcome: {:?}", report.outcome);
    println!("  dispatched: {}", report.dispatched);
    println!("  elapsed: {:.3} units", in_units(report.elapsed, time_unit));
    println!();

    for (id, timing) in report.timeline.iter() {
        let started = in_units(timing.started, time_unit);
        match timing.finished {
            Some(finished) => println!(
                "  - {id}: started @{started:.3}, done @{:.3}",
                in_units(finished, time_unit)
            ),
            None => println!("  - {id}: started @{started:.3}, not finished"),
        }
    }
}

/// Simple dry-run output: print nodes, edges and the expected finish time.
fn print_dry_run(graph: &DagGraph, time_unit: Duration) -> Result<()> {
    println!("dagflow dry-run");
    println!("  time_unit = {:?}", time_unit);
    println!("  roots = {:?}", graph.roots());
    println!();

    println!("nodes ({}):", graph.len());
    for id in graph.nodes() {
        let duration = graph.duration_of(id).unwrap_or_default();
        println!("  - {id}");
        println!("      duration: {:.3} units", in_units(duration, time_unit));
        if !graph.parents_of(id).is_empty() {
            println!("      after: {:?}", graph.parents_of(id));
        }
        if !graph.children_of(id).is_empty() {
            println!("      children: {:?}", graph.children_of(id));
        }
        if graph.is_root(id) && !graph.parents_of(id).is_empty() {
            println!("      root: true");
        }
    }
    println!();

    let critical = graph.critical_path()?;
    println!(
        "expected finish (unlimited parallelism): {:.3} units",
        in_units(critical, time_unit)
    );

    debug!("dry-run complete (no execution)");
    Ok(())
}
