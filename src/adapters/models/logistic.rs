//! Logistic regression classifier.

use serde::{Deserialize, Serialize};

use crate::ports::{BinaryClassifier, ClassifierError};

/// `sigmoid(intercept + w . x)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LogisticModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }
}

impl BinaryClassifier for LogisticModel {
    fn predict_probability(&self, inputs: &[f64]) -> Result<f64, ClassifierError> {
        if inputs.len() != self.coefficients.len() {
            return Err(ClassifierError::WidthMismatch {
                expected: self.coefficients.len(),
                actual: inputs.len(),
            });
        }
        let logit: f64 = self.intercept
            + self
                .coefficients
                .iter()
                .zip(inputs)
                .map(|(w, x)| w * x)
                .sum::<f64>();
        let p = sigmoid(logit);
        if p.is_finite() {
            Ok(p)
        } else {
            Err(ClassifierError::InvalidOutput(p))
        }
    }

    fn input_width(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }

    fn family(&self) -> &'static str {
        "logistic"
    }
}

/// Logistic function, stable for large magnitudes.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_logit_is_half() {
        let model = LogisticModel::new(vec![1.0, -1.0], 0.0);
        assert_eq!(model.predict_probability(&[2.0, 2.0]).unwrap(), 0.5);
    }

    #[test]
    fn coefficients_push_probability() {
        let model = LogisticModel::new(vec![2.0], -1.0);
        let p = model.predict_probability(&[3.0]).unwrap();
        assert!((p - sigmoid(5.0)).abs() < 1e-12);
        assert!(p > 0.99);
    }

    #[test]
    fn width_is_checked() {
        let model = LogisticModel::new(vec![1.0, 1.0], 0.0);
        assert_eq!(
            model.predict_probability(&[1.0]),
            Err(ClassifierError::WidthMismatch { expected: 2, actual: 1 })
        );
    }

    #[test]
    fn sigmoid_is_stable() {
        assert_eq!(sigmoid(-1000.0), 0.0);
        assert_eq!(sigmoid(1000.0), 1.0);
    }
}
