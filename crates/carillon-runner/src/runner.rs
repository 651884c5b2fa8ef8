//! The deadline loop around a positioned schedule.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use tokio_util::sync::CancellationToken;

use carillon_schedule::{Direction, Schedule, ScheduleSpec};

use crate::error::RunnerResult;
use crate::task::Task;

/// Drives a schedule: computes each next instant, waits for it, and
/// dispatches the task.
///
/// The runner is the sole owner of the schedule state; rings are only
/// mutated between deadline waits.
pub struct Runner {
    schedule: Schedule,
    task: Arc<dyn Task>,
}

/// Time left until `next`. A deadline already in the past waits zero: a
/// stalled host fires once for the missed instant and moves on, with no
/// per-period compensation.
fn sleep_duration(next: &DateTime<FixedOffset>, now: &DateTime<Utc>) -> Duration {
    next.signed_duration_since(now)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

impl Runner {
    /// ## Summary
    /// Builds the schedule from `spec` and boxes the task.
    ///
    /// ## Errors
    /// Returns any schedule construction error (empty ring, unsatisfiable
    /// date selection).
    pub fn new(spec: &ScheduleSpec, task: impl Task) -> RunnerResult<Self> {
        Ok(Self {
            schedule: Schedule::new(spec)?,
            task: Arc::new(task),
        })
    }

    /// ## Summary
    /// Runs the deadline loop until `shutdown` is cancelled.
    ///
    /// Each iteration advances the schedule to its next instant, sleeps
    /// until that instant, and spawns the task with it. Dispatch is
    /// fire-and-forget: the loop never awaits a firing, so slow tasks
    /// overlap with later ones. Cancellation drops the armed deadline
    /// without firing it and returns.
    ///
    /// ## Errors
    /// Returns a schedule error if an instant cannot be composed, which a
    /// successfully constructed schedule never produces.
    pub async fn run(mut self, shutdown: CancellationToken) -> RunnerResult<()> {
        self.schedule.init()?;
        tracing::info!(zone = %self.schedule.zone(), "runner started");

        loop {
            let next = self.schedule.tick(Direction::Forward)?;
            let wait = sleep_duration(&next, &Utc::now());
            let wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX);
            tracing::debug!(at = %next, wait_ms, "deadline armed");

            tokio::select! {
                () = shutdown.cancelled() => {
                    tracing::info!("runner stopped");
                    return Ok(());
                }
                () = tokio::time::sleep(wait) => {
                    tracing::info!(at = %next, "firing");
                    let task = Arc::clone(&self.task);
                    tokio::spawn(async move { task.fire(next).await });
                }
            }
        }
    }
}
