// src/exec/mod.rs

//! Task-execution layer.
//!
//! The watch engine only ever *enqueues* actions; it never waits for them.
//!
//! - [`backend`] provides the `ActionQueue` trait and the production
//!   `CommandQueue`, which tests replace with a recording fake.
//! - [`executor_loop`] owns the background loop that runs queued actions in
//!   order and implements the soft-fail path.
//! - [`task_runner`] runs a single action's shell command.

pub mod backend;
pub mod executor_loop;
pub mod task_runner;

pub use backend::{ActionQueue, CommandQueue};
pub use executor_loop::spawn_executor;

/// Outcome of one action process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Success,
    Failed(i32),
}
