use std::f64::consts::PI;

use rustfft::num_complex::Complex64;

use crate::rheology::{ComplexModuli, ComplexSpectrum, RheologyError};

/// Physical scales entering the generalized Stokes-Einstein relation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeConstants {
    /// Thermal energy scale.
    pub kt: f64,
    /// Probe length scale.
    pub at: f64,
}

impl ProbeConstants {
    pub fn new(kt: f64, at: f64) -> Result<Self, RheologyError> {
        if !kt.is_finite() {
            return Err(RheologyError::InvalidDomain(format!(
                "kt must be finite, got {kt}"
            )));
        }
        if !at.is_finite() || at <= 0.0 {
            return Err(RheologyError::InvalidDomain(format!(
                "at must be positive and finite, got {at}"
            )));
        }
        Ok(Self { kt, at })
    }

    /// `kt / (6π·at)`
    pub fn prefactor(&self) -> f64 {
        self.kt / (6.0 * PI * self.at)
    }
}

/// `G*(ω) = kt / (6π·at) · (1 / (iω·ĝ(ω)) − 1)`, split into storage and loss parts.
///
/// A vanishing `iω·ĝ(ω)` is reported as `DivisionDomain` rather than turned into an
/// infinite modulus.
pub fn derive_moduli(
    spectrum: &ComplexSpectrum,
    constants: ProbeConstants,
) -> Result<ComplexModuli, RheologyError> {
    let prefactor = constants.prefactor();
    let one = Complex64::new(1.0, 0.0);
    let mut storage = Vec::with_capacity(spectrum.len());
    let mut loss = Vec::with_capacity(spectrum.len());
    for (index, (&omega, &value)) in spectrum
        .frequencies
        .iter()
        .zip(&spectrum.values)
        .enumerate()
    {
        let denominator = Complex64::new(0.0, omega) * value;
        if denominator.re == 0.0 && denominator.im == 0.0 {
            return Err(RheologyError::DivisionDomain {
                index,
                frequency: omega,
            });
        }
        // finv scales by the norm, so tiny denominators do not underflow to 0/0
        let g_star = (denominator.finv() - one) * prefactor;
        storage.push(g_star.re);
        loss.push(g_star.im);
    }
    Ok(ComplexModuli {
        frequencies: spectrum.frequencies.to_vec(),
        storage,
        loss,
    })
}
