// src/dag/mod.rs

//! DAG representation and dispatch.
//!
//! - [`graph`] holds the immutable topology and its validation.
//! - [`store`] holds per-node run state behind per-node locks.
//! - [`dispatcher`] claims ready nodes and propagates completions.
//! - [`node`] provides snapshots and claim/scheduling types.
//! - [`dispatch_step`] defines the result types for dispatcher steps.

pub mod dispatch_step;
pub mod dispatcher;
pub mod graph;
pub mod node;
pub mod store;

pub use dispatch_step::{CompletionStep, DispatchStep};
pub use dispatcher::Dispatcher;
pub use graph::{DagGraph, GraphBuilder};
pub use node::{Claim, NodeSnapshot, ScheduledNode, StatusCounts};
pub use store::NodeStore;
