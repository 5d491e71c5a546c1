//! StandardScaler - per-column standardization fitted at training time.

use serde::{Deserialize, Serialize};

use crate::ports::ClassifierError;

/// Fitted `(x - mean) / scale` transform.
///
/// Columns with a zero or non-finite scale pass through centered but
/// unscaled, matching how constant training columns are handled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// A scaler that leaves `width` columns untouched.
    pub fn identity(width: usize) -> Self {
        Self {
            mean: vec![0.0; width],
            scale: vec![1.0; width],
        }
    }

    /// Fits column means and population standard deviations.
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if rows.is_empty() {
            return Self::identity(width);
        }
        let n = rows.len() as f64;
        let mut mean = vec![0.0; width];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v / n;
            }
        }
        let mut scale = vec![0.0; width];
        for row in rows {
            for ((s, v), m) in scale.iter_mut().zip(row).zip(&mean) {
                *s += (v - m).powi(2) / n;
            }
        }
        for s in scale.iter_mut() {
            *s = s.sqrt();
        }
        Self { mean, scale }
    }

    pub fn width(&self) -> usize {
        self.mean.len()
    }

    /// Standardizes one row.
    ///
    /// # Errors
    ///
    /// Returns `ClassifierError::WidthMismatch` if the row width differs from
    /// the fitted width, and `Malformed` if mean and scale disagree.
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ClassifierError> {
        if self.mean.len() != self.scale.len() {
            return Err(ClassifierError::Malformed(format!(
                "scaler has {} means but {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if row.len() != self.width() {
            return Err(ClassifierError::WidthMismatch {
                expected: self.width(),
                actual: row.len(),
            });
        }
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| {
                let centered = x - m;
                if s.is_finite() && *s > f64::EPSILON {
                    centered / s
                } else {
                    centered
                }
            })
            .collect())
    }
}
