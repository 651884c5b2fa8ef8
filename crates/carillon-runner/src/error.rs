use thiserror::Error;

/// Runner-level errors
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error(transparent)]
    ScheduleError(#[from] carillon_schedule::error::ScheduleError),
}

pub type RunnerResult<T> = std::result::Result<T, RunnerError>;
