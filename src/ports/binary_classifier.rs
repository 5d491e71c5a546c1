//! BinaryClassifier port - Interface for pre-trained pattern classifiers.
//!
//! Classifiers are synchronous: they are small in-process models evaluated
//! over a scaled feature subset, not remote collaborators.

use std::fmt::Debug;

/// A trained binary probability model over a fixed-width input.
pub trait BinaryClassifier: Send + Sync + Debug {
    /// Probability of the positive class for one input row.
    fn predict_probability(&self, inputs: &[f64]) -> Result<f64, ClassifierError>;

    /// Expected input width, if the model knows it.
    fn input_width(&self) -> Option<usize> {
        None
    }

    /// Short description of the model family (for logs).
    fn family(&self) -> &'static str;
}

/// Errors raised by a classifier.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("input width {actual} does not match model width {expected}")]
    WidthMismatch { expected: usize, actual: usize },

    #[error("classifier produced invalid probability {0}")]
    InvalidOutput(f64),

    #[error("malformed model: {0}")]
    Malformed(String),
}
