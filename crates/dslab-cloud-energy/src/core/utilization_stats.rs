//! Utilization samples accumulator.

use crate::core::error::NumericError;

/// Accumulates utilization samples to compute their mean.
#[derive(Clone, Debug, Default)]
pub struct UtilizationStats {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
}

impl UtilizationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a sample. Values are clamped to `[0, 1]`, non-finite values are rejected.
    pub fn add(&mut self, value: f64) -> Result<(), NumericError> {
        if !value.is_finite() {
            return Err(NumericError::NaNPropagation {
                what: "utilization sample".to_string(),
                value,
            });
        }
        let value = value.clamp(0., 1.);
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
        Ok(())
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the mean of samples or `None` if there were no samples.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.sum / self.count as f64)
    }

    pub fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }
}
