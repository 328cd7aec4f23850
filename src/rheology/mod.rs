// src/rheology/mod.rs
pub mod error;
pub mod evaluator;
pub mod kernel;
pub mod moduli;
pub mod pipeline;
pub mod plot;
pub mod resample;
pub mod series;
pub mod spline;
pub mod table;

pub use error::{RheologyError, TaskFailure};
pub use evaluator::{FrequencyTask, Sequential, SpectrumEvaluator, WorkerPool};
pub use kernel::{transform, transform_parallel, transform_series, transform_with, SegmentKernel};
pub use moduli::{derive_moduli, ProbeConstants};
pub use pipeline::{moduli_from_signal, moduli_from_signal_parallel, MicrorheologyPipeline, ModuliReport};
pub use plot::{render_moduli_png, render_signal_png, PlotStyle};
pub use resample::resample_log;
pub use series::{ComplexModuli, ComplexSpectrum, FrequencyGrid, TimeSeries};
pub use spline::CubicSpline;
pub use table::SignalTable;
