//! The user-supplied callback fired at each scheduled instant.

use chrono::{DateTime, FixedOffset};
use futures::future::BoxFuture;

/// A schedulable task.
///
/// `fire` receives the instant the schedule computed, not the wall clock at
/// dispatch. Firings are not serialized: a slow task overlaps with later
/// firings and must tolerate that itself.
pub trait Task: Send + Sync + 'static {
    fn fire(&self, at: DateTime<FixedOffset>) -> BoxFuture<'static, ()>;
}

impl<F, Fut> Task for F
where
    F: Fn(DateTime<FixedOffset>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn fire(&self, at: DateTime<FixedOffset>) -> BoxFuture<'static, ()> {
        Box::pin(self(at))
    }
}
