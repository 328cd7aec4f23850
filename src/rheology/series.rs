use ndarray::Array1;
use rustfft::num_complex::Complex64;

use crate::rheology::RheologyError;

/// Sampled relaxation curve: times strictly increasing, everything finite.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSeries {
    times: Array1<f64>,
    values: Array1<f64>,
}

impl TimeSeries {
    pub fn new(
        times: impl Into<Array1<f64>>,
        values: impl Into<Array1<f64>>,
    ) -> Result<Self, RheologyError> {
        let times = times.into();
        let values = values.into();
        if times.len() != values.len() {
            return Err(RheologyError::InvalidDomain(format!(
                "time has {} samples but signal has {}",
                times.len(),
                values.len()
            )));
        }
        if let Some(idx) = times.iter().position(|t| !t.is_finite()) {
            return Err(RheologyError::InvalidDomain(format!(
                "time sample {idx} is not finite"
            )));
        }
        if let Some(idx) = values.iter().position(|g| !g.is_finite()) {
            return Err(RheologyError::InvalidDomain(format!(
                "signal sample {idx} is not finite"
            )));
        }
        if let Some(idx) = (1..times.len()).find(|&k| times[k] <= times[k - 1]) {
            return Err(RheologyError::InvalidDomain(format!(
                "time must be strictly increasing (t[{}] = {} follows {})",
                idx,
                times[idx],
                times[idx - 1]
            )));
        }
        Ok(Self { times, values })
    }

    pub fn times(&self) -> &Array1<f64> {
        &self.times
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn first_time(&self) -> Option<f64> {
        self.times.first().copied()
    }

    pub fn last_time(&self) -> Option<f64> {
        self.times.last().copied()
    }

    /// Smallest strictly positive time; a `t = 0` origin sample is skipped.
    pub fn min_positive_time(&self) -> Option<f64> {
        self.times.iter().copied().find(|&t| t > 0.0)
    }

    /// Copy without the leading `t = 0` sample, if there is one.
    pub fn without_origin(&self) -> Option<TimeSeries> {
        if self.first_time() != Some(0.0) {
            return None;
        }
        let n = self.len();
        Some(Self {
            times: self.times.slice(ndarray::s![1..n]).to_owned(),
            values: self.values.slice(ndarray::s![1..n]).to_owned(),
        })
    }

    /// Slope of the final linear segment, used to sanity-check `g_dot_inf`.
    pub fn terminal_slope(&self) -> Option<f64> {
        let n = self.len();
        if n < 2 {
            return None;
        }
        Some((self.values[n - 1] - self.values[n - 2]) / (self.times[n - 1] - self.times[n - 2]))
    }
}

/// Log-spaced angular frequencies at which the transform is evaluated.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyGrid {
    omegas: Array1<f64>,
}

impl FrequencyGrid {
    pub fn log_spaced(min_omega: f64, max_omega: f64, count: usize) -> Result<Self, RheologyError> {
        if count == 0 {
            return Err(RheologyError::InvalidConfig(
                "frequency grid needs at least one point".into(),
            ));
        }
        if !(min_omega.is_finite() && max_omega.is_finite()) || min_omega <= 0.0 || max_omega <= 0.0
        {
            return Err(RheologyError::InvalidDomain(format!(
                "frequency bounds must be positive and finite, got [{min_omega}, {max_omega}]"
            )));
        }
        let omegas = Array1::logspace(10.0, min_omega.log10(), max_omega.log10(), count);
        Ok(Self { omegas })
    }

    /// Grid spanning `1 / max(t)` to `1 / min⁺(t)`.
    pub fn for_series(series: &TimeSeries, count: usize) -> Result<Self, RheologyError> {
        let t_max = series
            .last_time()
            .ok_or(RheologyError::InsufficientData {
                required: 1,
                actual: 0,
            })?;
        let t_min = series.min_positive_time().ok_or_else(|| {
            RheologyError::InvalidDomain("time axis has no positive samples".into())
        })?;
        Self::log_spaced(1.0 / t_max, 1.0 / t_min, count)
    }

    pub fn omegas(&self) -> &Array1<f64> {
        &self.omegas
    }

    pub fn len(&self) -> usize {
        self.omegas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.omegas.is_empty()
    }
}

/// One complex transform value per grid frequency, in grid order.
#[derive(Clone, Debug)]
pub struct ComplexSpectrum {
    pub frequencies: Array1<f64>,
    pub values: Array1<Complex64>,
}

impl ComplexSpectrum {
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

/// Storage (G′) and loss (G″) moduli aligned with `frequencies`.
#[derive(Clone, Debug, serde::Serialize)]
pub struct ComplexModuli {
    pub frequencies: Vec<f64>,
    pub storage: Vec<f64>,
    pub loss: Vec<f64>,
}

impl ComplexModuli {
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.frequencies
            .iter()
            .zip(&self.storage)
            .zip(&self.loss)
            .map(|((w, gp), gpp)| (*w, *gp, *gpp))
    }
}
