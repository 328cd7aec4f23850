//! Execution strategies for the per-frequency transform sums.
//!
//! The kernel hands an evaluator a list of frequencies and a task that maps one
//! frequency to one complex value. Evaluators only decide where and in which
//! order the task runs; the math lives in the kernel, so every strategy returns
//! the same numbers.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;
use rustfft::num_complex::Complex64;

use crate::rheology::error::TaskFailure;
use crate::rheology::RheologyError;

/// Per-frequency work item shared with the evaluator.
pub type FrequencyTask<'a> = dyn Fn(f64) -> Complex64 + Sync + 'a;

/// Schedules one task per frequency and returns the results in input order.
pub trait SpectrumEvaluator: Send + Sync {
    fn label(&self) -> &'static str;
    fn evaluate(
        &self,
        omegas: &[f64],
        task: &FrequencyTask<'_>,
    ) -> Result<Vec<Complex64>, RheologyError>;
}

/// Single-threaded loop over the grid in ascending order.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sequential;

impl SpectrumEvaluator for Sequential {
    fn label(&self) -> &'static str {
        "sequential"
    }

    fn evaluate(
        &self,
        omegas: &[f64],
        task: &FrequencyTask<'_>,
    ) -> Result<Vec<Complex64>, RheologyError> {
        Ok(omegas.iter().map(|&omega| task(omega)).collect())
    }
}

/// Fixed-size rayon pool created for a single evaluation; its threads are joined
/// before `evaluate` returns.
#[derive(Clone, Copy, Debug)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self, RheologyError> {
        if workers == 0 {
            return Err(RheologyError::InvalidConfig(
                "worker pool needs at least one worker".into(),
            ));
        }
        Ok(Self { workers })
    }
}

impl SpectrumEvaluator for WorkerPool {
    fn label(&self) -> &'static str {
        "worker-pool"
    }

    fn evaluate(
        &self,
        omegas: &[f64],
        task: &FrequencyTask<'_>,
    ) -> Result<Vec<Complex64>, RheologyError> {
        log::info!(
            "dispatching {} frequencies across {} workers",
            omegas.len(),
            self.workers
        );

        // Task `index` owns `buffer[index]` and nothing else. `par_iter_mut` hands
        // out disjoint `&mut` slots, so the writes need no lock.
        let mut buffer = vec![Complex64::new(0.0, 0.0); omegas.len()];
        // The scoped pool joins every worker thread before `build_scoped` returns.
        let mut failures: Vec<TaskFailure> = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|idx| format!("microrheo-worker-{idx}"))
            .build_scoped(
                |thread| thread.run(),
                |pool| {
                    pool.install(|| {
                        buffer
                            .par_iter_mut()
                            .zip(omegas.par_iter())
                            .enumerate()
                            .filter_map(|(index, (slot, &omega))| {
                                match panic::catch_unwind(AssertUnwindSafe(|| task(omega))) {
                                    Ok(value) => {
                                        *slot = value;
                                        None
                                    }
                                    Err(payload) => Some(TaskFailure {
                                        index,
                                        frequency: omega,
                                        reason: panic_reason(payload.as_ref()),
                                    }),
                                }
                            })
                            .collect::<Vec<TaskFailure>>()
                    })
                },
            )
            .map_err(|err| RheologyError::WorkerPool(err.to_string()))?;

        if failures.is_empty() {
            Ok(buffer)
        } else {
            failures.sort_by_key(|f| f.index);
            log::warn!("{} of {} tasks failed", failures.len(), omegas.len());
            Err(RheologyError::WorkerFailure { failures })
        }
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "task panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(omega: f64) -> Complex64 {
        Complex64::new(omega * omega, -omega)
    }

    #[test]
    fn sequential_keeps_grid_order() {
        let omegas = [0.1, 1.0, 10.0];
        let out = Sequential.evaluate(&omegas, &square).unwrap();
        assert_eq!(out, vec![square(0.1), square(1.0), square(10.0)]);
    }

    #[test]
    fn pool_writes_each_index_once() {
        let omegas: Vec<f64> = (1..=64).map(|k| k as f64 * 0.25).collect();
        let expected = Sequential.evaluate(&omegas, &square).unwrap();
        for workers in [1, 3, 64] {
            let pool = WorkerPool::new(workers).unwrap();
            assert_eq!(pool.evaluate(&omegas, &square).unwrap(), expected);
        }
    }

    #[test]
    fn pool_collects_every_failure_after_join() {
        let omegas: Vec<f64> = (0..10).map(|k| k as f64).collect();
        let task = |omega: f64| {
            if omega == 3.0 || omega == 7.0 {
                panic!("bad frequency {omega}");
            }
            Complex64::new(omega, 0.0)
        };
        let err = WorkerPool::new(4).unwrap().evaluate(&omegas, &task).unwrap_err();
        match err {
            RheologyError::WorkerFailure { failures } => {
                let indices: Vec<usize> = failures.iter().map(|f| f.index).collect();
                assert_eq!(indices, vec![3, 7]);
                assert!(failures[0].reason.contains("bad frequency 3"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn tasks_run_on_the_per_call_pool() {
        use std::collections::HashSet;
        use std::sync::Mutex;

        let caller = std::thread::current().id();
        let seen = Mutex::new(HashSet::new());
        let omegas: Vec<f64> = (1..=32).map(|k| k as f64).collect();
        let task = |omega: f64| {
            let current = std::thread::current();
            assert_ne!(current.id(), caller);
            let name = current.name().unwrap_or("").to_string();
            assert!(name.starts_with("microrheo-worker-"), "ran on {name}");
            seen.lock().unwrap().insert(name);
            Complex64::new(omega, 0.0)
        };
        WorkerPool::new(3).unwrap().evaluate(&omegas, &task).unwrap();
        let seen = seen.into_inner().unwrap();
        assert!(!seen.is_empty() && seen.len() <= 3);
    }

    #[test]
    fn empty_grid_is_fine() {
        let out = WorkerPool::new(2).unwrap().evaluate(&[], &square).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn zero_workers_rejected() {
        assert!(matches!(
            WorkerPool::new(0),
            Err(RheologyError::InvalidConfig(_))
        ));
    }
}
