use std::fmt;

use thiserror::Error;

/// A single parallel task that did not produce a value.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskFailure {
    pub index: usize,
    pub frequency: f64,
    pub reason: String,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "task {} (omega = {:e}): {}",
            self.index, self.frequency, self.reason
        )
    }
}

#[derive(Debug, Error)]
pub enum RheologyError {
    #[error("insufficient data: need at least {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[error("invalid domain: {0}")]
    InvalidDomain(String),
    #[error("{} parallel task(s) failed: {}", .failures.len(), join_failures(.failures))]
    WorkerFailure { failures: Vec<TaskFailure> },
    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),
    #[error("division by zero while deriving moduli at index {index} (omega = {frequency:e})")]
    DivisionDomain { index: usize, frequency: f64 },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("table line {line}: {message}")]
    Table { line: usize, message: String },
    #[error("failed to render plot: {0}")]
    Plot(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn join_failures(failures: &[TaskFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for RheologyError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        RheologyError::Plot(format!("{value:?}"))
    }
}

impl From<image::ImageError> for RheologyError {
    fn from(value: image::ImageError) -> Self {
        RheologyError::Plot(value.to_string())
    }
}

impl From<ndarray::ShapeError> for RheologyError {
    fn from(value: ndarray::ShapeError) -> Self {
        RheologyError::Table {
            line: 0,
            message: value.to_string(),
        }
    }
}
