// src/exec/mod.rs

//! Work execution layer.
//!
//! This module performs the (simulated) work of dispatched nodes and reports
//! back to the runtime via `RuntimeEvent::NodeCompleted`.
//!
//! - [`service`] provides the `WorkService` trait and the one-shot
//!   `CompletionSignal` handed to every unit of work.
//! - [`timer`] contains `TimerWorkService`, which the runtime uses in
//!   production and which tests can replace with a fake implementation.

pub mod service;
pub mod timer;

pub use service::{CompletionSignal, WorkService};
pub use timer::TimerWorkService;
