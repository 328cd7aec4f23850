use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::rheology::{RheologyError, Sequential, SpectrumEvaluator, WorkerPool};

/// Worker count used by the parallel evaluator unless configured otherwise.
pub const DEFAULT_WORKERS: usize = 5;
pub const DEFAULT_FREQUENCIES: usize = 100;
pub const DEFAULT_OVERSAMPLING: usize = 10;
pub const DEFAULT_ASYMPTOTE_TOLERANCE: f64 = 1e-3;

/// What to do when `g_dot_inf` disagrees with the slope of the last measured segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AsymptoteCheck {
    /// Use `g_dot_inf` as given.
    #[default]
    Accept,
    /// Log a warning and carry on.
    Warn,
    /// Fail with `InvalidDomain`.
    Reject,
}

/// How the per-frequency sums are scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum Execution {
    #[default]
    Sequential,
    Parallel { workers: usize },
}

impl Execution {
    pub fn evaluator(&self) -> Result<Box<dyn SpectrumEvaluator>, RheologyError> {
        match *self {
            Execution::Sequential => Ok(Box::new(Sequential)),
            Execution::Parallel { workers } => Ok(Box::new(WorkerPool::new(workers)?)),
        }
    }
}

/// Parameters of the one-sided transform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Signal value at `t = 0`.
    pub g_0: f64,
    /// Time derivative of the signal as `t → ∞`.
    pub g_dot_inf: f64,
    pub n_frequencies: usize,
    /// Resample on a log-spaced grid through a cubic spline before transforming.
    pub interpolate: bool,
    /// Length multiplier of the resampled series.
    pub oversampling: usize,
    /// Pool size for the parallel evaluator; checked when the pool is built.
    pub workers: usize,
    pub asymptote: AsymptoteCheck,
    /// Absolute slope difference tolerated by `asymptote`.
    pub asymptote_tolerance: f64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            g_0: 1.0,
            g_dot_inf: 0.0,
            n_frequencies: DEFAULT_FREQUENCIES,
            interpolate: true,
            oversampling: DEFAULT_OVERSAMPLING,
            workers: DEFAULT_WORKERS,
            asymptote: AsymptoteCheck::Accept,
            asymptote_tolerance: DEFAULT_ASYMPTOTE_TOLERANCE,
        }
    }
}

impl TransformConfig {
    pub fn validate(&self) -> Result<(), RheologyError> {
        if self.n_frequencies == 0 {
            return Err(RheologyError::InvalidConfig(
                "n_frequencies must be at least 1".into(),
            ));
        }
        if self.interpolate && self.oversampling == 0 {
            return Err(RheologyError::InvalidConfig(
                "oversampling must be at least 1".into(),
            ));
        }
        if !self.g_0.is_finite() || !self.g_dot_inf.is_finite() {
            return Err(RheologyError::InvalidDomain(
                "g_0 and g_dot_inf must be finite".into(),
            ));
        }
        if self.asymptote_tolerance.is_nan() || self.asymptote_tolerance < 0.0 {
            return Err(RheologyError::InvalidConfig(
                "asymptote_tolerance must be non-negative".into(),
            ));
        }
        Ok(())
    }

    pub fn parallel_execution(&self) -> Execution {
        Execution::Parallel {
            workers: self.workers,
        }
    }
}

/// Parameters for turning a measured table into moduli.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuliConfig {
    /// Thermal energy scale.
    pub kt: f64,
    /// Probe length scale.
    pub at: f64,
    pub interpolate: bool,
    /// Oversampling factor, only used when `interpolate` is set.
    pub n_times: usize,
    pub n_frequencies: usize,
    pub workers: usize,
    pub asymptote: AsymptoteCheck,
    pub asymptote_tolerance: f64,
}

impl Default for ModuliConfig {
    fn default() -> Self {
        Self {
            kt: 1e-6,
            at: 1e6,
            interpolate: false,
            n_times: DEFAULT_OVERSAMPLING,
            n_frequencies: DEFAULT_FREQUENCIES,
            workers: DEFAULT_WORKERS,
            asymptote: AsymptoteCheck::Accept,
            asymptote_tolerance: DEFAULT_ASYMPTOTE_TOLERANCE,
        }
    }
}

impl ModuliConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RheologyError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, RheologyError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn transform_config(&self) -> TransformConfig {
        TransformConfig {
            n_frequencies: self.n_frequencies,
            interpolate: self.interpolate,
            oversampling: self.n_times,
            workers: self.workers,
            asymptote: self.asymptote,
            asymptote_tolerance: self.asymptote_tolerance,
            ..TransformConfig::default()
        }
    }
}
