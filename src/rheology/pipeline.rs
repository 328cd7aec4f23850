use crate::config::{Execution, ModuliConfig};
use crate::rheology::kernel::transform_series;
use crate::rheology::moduli::{derive_moduli, ProbeConstants};
use crate::rheology::{ComplexModuli, ComplexSpectrum, RheologyError, SignalTable, TimeSeries};

/// Everything computed on the way from a table to moduli.
#[derive(Clone, Debug)]
pub struct ModuliReport {
    pub series: TimeSeries,
    pub spectrum: ComplexSpectrum,
    pub moduli: ComplexModuli,
}

/// Table in, moduli out: `1 − signal` → transform → Stokes-Einstein.
pub struct MicrorheologyPipeline {
    config: ModuliConfig,
    execution: Execution,
}

impl MicrorheologyPipeline {
    pub fn new(config: ModuliConfig) -> Self {
        Self {
            config,
            execution: Execution::Sequential,
        }
    }

    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }

    pub fn process(&self, table: &SignalTable) -> Result<ComplexModuli, RheologyError> {
        Ok(self.process_detailed(table)?.moduli)
    }

    pub fn process_detailed(&self, table: &SignalTable) -> Result<ModuliReport, RheologyError> {
        let constants = ProbeConstants::new(self.config.kt, self.config.at)?;
        let transform_config = self.config.transform_config();
        transform_config.validate()?;
        let evaluator = self.execution.evaluator()?;

        let series = TimeSeries::new(table.time().to_vec(), table.complement())?;
        log::info!(
            "loaded {} samples spanning t = {:e}..{:e}",
            series.len(),
            series.first_time().unwrap_or(0.0),
            series.last_time().unwrap_or(0.0)
        );
        let spectrum = transform_series(&series, &transform_config, evaluator.as_ref())?;
        log::info!(
            "transformed onto {} frequencies with the {} evaluator",
            spectrum.len(),
            evaluator.label()
        );
        let moduli = derive_moduli(&spectrum, constants)?;
        Ok(ModuliReport {
            series,
            spectrum,
            moduli,
        })
    }
}

/// Storage and loss moduli from a measured table, evaluated sequentially.
pub fn moduli_from_signal(
    table: &SignalTable,
    config: &ModuliConfig,
) -> Result<ComplexModuli, RheologyError> {
    MicrorheologyPipeline::new(config.clone()).process(table)
}

/// Same as [`moduli_from_signal`] on a pool of `config.workers` threads.
pub fn moduli_from_signal_parallel(
    table: &SignalTable,
    config: &ModuliConfig,
) -> Result<ComplexModuli, RheologyError> {
    MicrorheologyPipeline::new(config.clone())
        .with_execution(config.transform_config().parallel_execution())
        .process(table)
}
