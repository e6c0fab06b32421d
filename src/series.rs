//! One-dimensional (timestamp, value) series

use crate::calendar::CalendarDate;
use crate::errors::{Result, SeasonalCycleError};
use serde::Serialize;

/// Values ordered by timestamp, one per time step of the source field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    times: Vec<CalendarDate>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// # Errors
    ///
    /// Returns [`SeasonalCycleError::MalformedInput`] if the lengths differ or
    /// the timestamps are not strictly increasing.
    pub fn new(times: Vec<CalendarDate>, values: Vec<f64>) -> Result<Self> {
        if times.len() != values.len() {
            return Err(SeasonalCycleError::MalformedInput {
                message: format!(
                    "{} timestamps for {} values",
                    times.len(),
                    values.len()
                ),
            });
        }
        if !times.windows(2).all(|w| w[0] < w[1]) {
            return Err(SeasonalCycleError::MalformedInput {
                message: "series timestamps are not strictly increasing".to_string(),
            });
        }
        Ok(Self { times, values })
    }

    /// Pair an already validated time axis with its values
    pub(crate) fn from_parts(times: Vec<CalendarDate>, values: Vec<f64>) -> Self {
        debug_assert_eq!(times.len(), values.len());
        Self { times, values }
    }

    /// Same timestamps, new values. Caller guarantees equal length.
    pub(crate) fn with_values(&self, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), self.times.len());
        Self {
            times: self.times.clone(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn times(&self) -> &[CalendarDate] {
        &self.times
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Arithmetic mean of all values; NaN for an empty series
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return f64::NAN;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = self.values.len() as f64;
        self.values.iter().sum::<f64>() / n
    }

    pub fn iter(&self) -> impl Iterator<Item = (CalendarDate, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }
}
