//! One-sided Fourier transform of sparse, log-sampled relaxation data and the
//! complex viscoelastic moduli derived from it (passive microrheology).
//!
//! ```no_run
//! use microrheo::{moduli_from_signal, ModuliConfig, SignalTable};
//!
//! let table = SignalTable::from_path("data.txt")?;
//! let moduli = moduli_from_signal(&table, &ModuliConfig::default())?;
//! for (omega, storage, loss) in moduli.rows() {
//!     println!("{omega} {storage} {loss}");
//! }
//! # Ok::<(), microrheo::RheologyError>(())
//! ```
pub mod config;
pub mod rheology;

pub use config::{AsymptoteCheck, Execution, ModuliConfig, TransformConfig};
pub use rheology::*;
