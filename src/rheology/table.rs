use std::path::Path;

use ndarray::{Array2, ArrayView1};

use crate::rheology::RheologyError;

/// Numeric table read from whitespace-delimited text.
///
/// Column 0 is time, column 1 the normalized signal; extra columns are kept but
/// not used by the moduli pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct SignalTable {
    data: Array2<f64>,
}

impl SignalTable {
    pub fn from_columns(time: Vec<f64>, signal: Vec<f64>) -> Result<Self, RheologyError> {
        if time.len() != signal.len() {
            return Err(RheologyError::InvalidDomain(format!(
                "time has {} rows but signal has {}",
                time.len(),
                signal.len()
            )));
        }
        let rows = time.len();
        let flat: Vec<f64> = time
            .into_iter()
            .zip(signal)
            .flat_map(|(t, s)| [t, s])
            .collect();
        Ok(Self {
            data: Array2::from_shape_vec((rows, 2), flat)?,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RheologyError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Blank lines and lines starting with `#` are skipped.
    pub fn parse(text: &str) -> Result<Self, RheologyError> {
        let mut columns: Option<usize> = None;
        let mut flat = Vec::new();
        let mut rows = 0;
        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let row = trimmed
                .split_whitespace()
                .map(|field| {
                    field.parse::<f64>().map_err(|err| RheologyError::Table {
                        line: line_no,
                        message: format!("`{field}` is not a number: {err}"),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            match columns {
                None if row.len() < 2 => {
                    return Err(RheologyError::Table {
                        line: line_no,
                        message: format!("need at least 2 columns, found {}", row.len()),
                    });
                }
                None => columns = Some(row.len()),
                Some(expected) if expected != row.len() => {
                    return Err(RheologyError::Table {
                        line: line_no,
                        message: format!("expected {expected} columns, found {}", row.len()),
                    });
                }
                Some(_) => {}
            }
            flat.extend(row);
            rows += 1;
        }
        let Some(cols) = columns else {
            return Err(RheologyError::InsufficientData {
                required: 1,
                actual: 0,
            });
        };
        Ok(Self {
            data: Array2::from_shape_vec((rows, cols), flat)?,
        })
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn columns(&self) -> usize {
        self.data.ncols()
    }

    pub fn column(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        (index < self.columns()).then(|| self.data.column(index))
    }

    pub fn time(&self) -> ArrayView1<'_, f64> {
        self.data.column(0)
    }

    pub fn signal(&self) -> ArrayView1<'_, f64> {
        self.data.column(1)
    }

    /// `1 − signal`, the quantity that gets transformed.
    pub fn complement(&self) -> Vec<f64> {
        self.signal().iter().map(|s| 1.0 - s).collect()
    }
}
