// src/engine/mod.rs

//! Orchestration engine for dagflow.
//!
//! This module ties together:
//! - the dispatcher (which nodes may start, which children a completion frees)
//! - the work service (how a node's work is performed)
//! - the main runtime event loop that reacts to:
//!   - node completion events
//!   - pause requests
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`]. Completions travel over an mpsc channel and
//! each one enqueues its newly-ready children, so there is no recursive
//! continuation chain.

use crate::types::NodeId;

/// Events flowing into the runtime from work services, signal handlers, etc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// A node's work finished.
    NodeCompleted { node: NodeId },
    /// The work service refused to start a dispatched node.
    LaunchFailed { node: NodeId },
    /// Stop claiming new nodes; let in-flight work drain.
    PauseRequested,
    /// Graceful shutdown requested (e.g. Ctrl-C). Stops without draining.
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod report;
pub mod runtime;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use report::{NodeTiming, RunOutcome, RunReport};
pub use runtime::Runtime;
