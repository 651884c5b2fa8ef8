//! Carillon scheduler - the async driver loop.
//!
//! The runner owns a positioned schedule and repeatedly asks it for the
//! next instant, arms a deadline, and races the deadline against a
//! cancellation token. Elapsed deadlines dispatch the task fire-and-forget
//! on its own tokio task; cancellation returns promptly without firing the
//! armed instant.

pub mod error;
pub mod runner;
pub mod task;

pub use error::{RunnerError, RunnerResult};
pub use runner::Runner;
pub use task::Task;
