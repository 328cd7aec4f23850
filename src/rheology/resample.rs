use ndarray::Array1;

use crate::rheology::spline::CubicSpline;
use crate::rheology::{RheologyError, TimeSeries};

/// Rebuild `series` on `factor × len` log-spaced times between its first and last
/// sample, with values taken from a cubic spline through the original points.
///
/// All times must be strictly positive; callers holding a `t = 0` origin sample
/// drop or shift it first.
pub fn resample_log(series: &TimeSeries, factor: usize) -> Result<TimeSeries, RheologyError> {
    if factor == 0 {
        return Err(RheologyError::InvalidConfig(
            "oversampling factor must be at least 1".into(),
        ));
    }
    let times = series.times();
    let (Some(t_min), Some(t_max)) = (series.first_time(), series.last_time()) else {
        return Err(RheologyError::InsufficientData {
            required: crate::rheology::spline::CUBIC_MIN_POINTS,
            actual: 0,
        });
    };
    if t_min <= 0.0 {
        return Err(RheologyError::InvalidDomain(format!(
            "log-space resampling needs strictly positive times, first sample is {t_min}"
        )));
    }
    let spline = CubicSpline::fit(&times.to_vec(), &series.values().to_vec())?;

    let count = series.len() * factor;
    let mut new_times = Array1::logspace(10.0, t_min.log10(), t_max.log10(), count);
    // pin the ends so the grid never strays outside the measured range
    new_times[0] = t_min;
    new_times[count - 1] = t_max;
    let new_values = Array1::from(spline.eval_many(&new_times.to_vec()));
    log::debug!(
        "resampled {} points onto {} log-spaced times in [{:e}, {:e}]",
        series.len(),
        count,
        t_min,
        t_max
    );
    TimeSeries::new(new_times, new_values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decay_series() -> TimeSeries {
        let times: Vec<f64> = (0..12).map(|k| 1e-3 * 2f64.powi(k)).collect();
        let values: Vec<f64> = times.iter().map(|t| (-t / 0.5).exp()).collect();
        TimeSeries::new(times, values).unwrap()
    }

    #[test]
    fn output_is_oversampled_and_log_spaced() {
        let series = decay_series();
        let out = resample_log(&series, 10).unwrap();
        assert_eq!(out.len(), series.len() * 10);
        assert_eq!(out.first_time(), series.first_time());
        assert_eq!(out.last_time(), series.last_time());
        let t = out.times();
        let ratio = t[2] / t[1];
        for k in 2..t.len() - 1 {
            assert!((t[k + 1] / t[k] - ratio).abs() < 1e-9);
        }
    }

    #[test]
    fn keeps_original_values_at_endpoints() {
        let series = decay_series();
        let out = resample_log(&series, 3).unwrap();
        let n = out.len();
        assert!((out.values()[0] - series.values()[0]).abs() < 1e-12);
        assert!((out.values()[n - 1] - series.values()[series.len() - 1]).abs() < 1e-12);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let series = decay_series();
        let first = resample_log(&series, 7).unwrap();
        let second = resample_log(&series, 7).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn factor_one_keeps_length() {
        let series = decay_series();
        assert_eq!(resample_log(&series, 1).unwrap().len(), series.len());
    }

    #[test]
    fn zero_time_is_rejected() {
        let series = TimeSeries::new(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 0.8, 0.5, 0.1]).unwrap();
        let err = resample_log(&series, 2).unwrap_err();
        assert!(matches!(err, RheologyError::InvalidDomain(_)));
    }

    #[test]
    fn three_points_cannot_be_resampled() {
        let series = TimeSeries::new(vec![1.0, 2.0, 3.0], vec![1.0, 0.5, 0.1]).unwrap();
        let err = resample_log(&series, 2).unwrap_err();
        assert!(matches!(err, RheologyError::InsufficientData { .. }));
    }

    #[test]
    fn zero_factor_is_a_config_error() {
        let series = decay_series();
        assert!(matches!(
            resample_log(&series, 0).unwrap_err(),
            RheologyError::InvalidConfig(_)
        ));
    }
}
