//! Not-a-knot cubic spline.
//!
//! The end conditions force the third derivative to be continuous across the
//! second and the second-to-last knot, so four points reproduce the unique cubic
//! through them. Evaluation outside the knot range keeps using the first or last
//! polynomial piece.

use crate::rheology::RheologyError;

/// Points required for a cubic fit.
pub const CUBIC_MIN_POINTS: usize = 4;

#[derive(Clone, Debug)]
pub struct CubicSpline {
    knots: Vec<f64>,
    values: Vec<f64>,
    second_derivs: Vec<f64>,
}

impl CubicSpline {
    /// `knots` must be strictly increasing and the same length as `values`.
    pub fn fit(knots: &[f64], values: &[f64]) -> Result<Self, RheologyError> {
        let n = knots.len();
        if n != values.len() {
            return Err(RheologyError::InvalidDomain(format!(
                "spline has {} knots but {} values",
                n,
                values.len()
            )));
        }
        if n < CUBIC_MIN_POINTS {
            return Err(RheologyError::InsufficientData {
                required: CUBIC_MIN_POINTS,
                actual: n,
            });
        }
        if knots.windows(2).any(|w| w[1] <= w[0]) {
            return Err(RheologyError::InvalidDomain(
                "spline knots must be strictly increasing".into(),
            ));
        }
        let second_derivs = solve_not_a_knot(knots, values);
        Ok(Self {
            knots: knots.to_vec(),
            values: values.to_vec(),
            second_derivs,
        })
    }

    pub fn eval(&self, x: f64) -> f64 {
        let last_piece = self.knots.len() - 2;
        // index of the piece whose left knot is <= x, clamped for extrapolation
        let i = self
            .knots
            .partition_point(|&k| k <= x)
            .saturating_sub(1)
            .min(last_piece);
        let (x0, x1) = (self.knots[i], self.knots[i + 1]);
        let (y0, y1) = (self.values[i], self.values[i + 1]);
        let (m0, m1) = (self.second_derivs[i], self.second_derivs[i + 1]);
        let h = x1 - x0;
        let a = x1 - x;
        let b = x - x0;
        m0 * a.powi(3) / (6.0 * h)
            + m1 * b.powi(3) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b
    }

    pub fn eval_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.eval(x)).collect()
    }
}

/// Second derivatives at every knot.
///
/// The interior equations are the usual tridiagonal moment equations; the two
/// not-a-knot conditions are substituted into the first and last of them so the
/// reduced system stays tridiagonal.
fn solve_not_a_knot(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let d: Vec<f64> = (0..n - 1).map(|i| (y[i + 1] - y[i]) / h[i]).collect();

    // unknowns M_1 ..= M_{n-2}
    let m = n - 2;
    let mut sub = vec![0.0; m];
    let mut diag = vec![0.0; m];
    let mut sup = vec![0.0; m];
    let mut rhs = vec![0.0; m];
    for row in 0..m {
        let i = row + 1;
        sub[row] = h[i - 1];
        diag[row] = 2.0 * (h[i - 1] + h[i]);
        sup[row] = h[i];
        rhs[row] = 6.0 * (d[i] - d[i - 1]);
    }

    // M_0 = ((h0 + h1) M_1 - h0 M_2) / h1
    let (h0, h1) = (h[0], h[1]);
    diag[0] = (h0 + h1) * (h0 + 2.0 * h1) / h1;
    sup[0] = (h1 - h0) * (h1 + h0) / h1;
    sub[0] = 0.0;

    // M_{n-1} = ((a + b) M_{n-2} - b M_{n-3}) / a, a = h_{n-3}, b = h_{n-2}
    let (a, b) = (h[n - 3], h[n - 2]);
    let last = m - 1;
    diag[last] = (a + b) * (2.0 * a + b) / a;
    if m > 1 {
        sub[last] = (a - b) * (a + b) / a;
    }
    sup[last] = 0.0;

    let interior = thomas(&sub, &diag, &sup, &rhs);

    let mut moments = vec![0.0; n];
    moments[1..n - 1].copy_from_slice(&interior);
    moments[0] = ((h0 + h1) * moments[1] - h0 * moments[2]) / h1;
    moments[n - 1] = ((a + b) * moments[n - 2] - b * moments[n - 3]) / a;
    moments
}

fn thomas(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Vec<f64> {
    let m = diag.len();
    let mut c = vec![0.0; m];
    let mut r = vec![0.0; m];
    c[0] = sup[0] / diag[0];
    r[0] = rhs[0] / diag[0];
    for i in 1..m {
        let denom = diag[i] - sub[i] * c[i - 1];
        c[i] = sup[i] / denom;
        r[i] = (rhs[i] - sub[i] * r[i - 1]) / denom;
    }
    let mut out = vec![0.0; m];
    out[m - 1] = r[m - 1];
    for i in (0..m - 1).rev() {
        out[i] = r[i] - c[i] * out[i + 1];
    }
    out
}
