//! Recalibration of implausibly small model probabilities.
//!
//! Some upstream models emit probabilities that are meaningless on their own
//! scale (well below 1e-4). They are remapped through fixed piecewise-linear
//! bands before combination; above the last band the value is scaled up and
//! capped.

use serde::{Deserialize, Serialize};

/// One remapping band: inputs in `[previous upper, upper)` map linearly onto
/// `[floor, ceiling)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecalibrationBand {
    pub upper: f64,
    pub floor: f64,
    pub ceiling: f64,
}

/// The full recalibration table. Bands must be sorted by `upper`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecalibrationTable {
    pub bands: Vec<RecalibrationBand>,
    /// Multiplier applied above the last band.
    pub scale: f64,
    /// Upper cap for scaled values.
    pub cap: f64,
}

impl Default for RecalibrationTable {
    fn default() -> Self {
        let band = |upper, floor, ceiling| RecalibrationBand { upper, floor, ceiling };
        Self {
            bands: vec![
                band(0.0001, 0.10, 0.20),
                band(0.001, 0.20, 0.30),
                band(0.01, 0.30, 0.40),
                band(0.1, 0.40, 0.50),
                band(0.2, 0.50, 0.60),
            ],
            scale: 1.2,
            cap: 0.95,
        }
    }
}

impl RecalibrationTable {
    /// Remaps one probability. Non-finite input maps to 0.5.
    pub fn apply(&self, probability: f64) -> f64 {
        if !probability.is_finite() {
            return 0.5;
        }
        let p = probability.clamp(0.0, 1.0);
        let mut lower = 0.0;
        for band in &self.bands {
            if p < band.upper {
                let width = band.upper - lower;
                let t = if width > 0.0 { (p - lower) / width } else { 0.0 };
                return band.floor + t * (band.ceiling - band.floor);
            }
            lower = band.upper;
        }
        (p * self.scale).min(self.cap)
    }

    /// Index of the band a probability falls into; `None` above the last band.
    pub fn band_of(&self, probability: f64) -> Option<usize> {
        self.bands.iter().position(|b| probability < b.upper)
    }
}
