//! Polynomial detrending of a time series
//!
//! The trend is a least-squares polynomial over the sample index `0..N`, not
//! over calendar time, so uneven month lengths are not modelled. The
//! detrended series is re-centred on the original mean:
//!
//! ```text
//! out[i] = value[i] - trend(i) + mean(value)
//! ```
//!
//! Because the fit includes a constant term its residuals sum to zero, which
//! makes `mean(out) == mean(value)` up to rounding.

use crate::errors::{Result, SeasonalCycleError};
use crate::series::TimeSeries;
use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use tracing::{debug, warn};

/// Polynomial degree used when none is configured
pub const DEFAULT_DEGREE: usize = 4;

/// A fitted polynomial trend, coefficients in ascending power
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendModel {
    degree: usize,
    coefficients: Vec<f64>,
}

impl TrendModel {
    /// Least-squares fit of `values` against the index `0..values.len()`
    ///
    /// The Vandermonde columns are scaled to unit norm before the SVD solve
    /// and the coefficients unscaled afterwards.
    ///
    /// # Errors
    ///
    /// - [`SeasonalCycleError::InsufficientData`] if `values.len() <= degree`
    /// - [`SeasonalCycleError::FitError`] if a value is not finite or the
    ///   solve fails
    pub fn fit(values: &[f64], degree: usize) -> Result<Self> {
        let n = values.len();
        if n <= degree {
            return Err(SeasonalCycleError::InsufficientData { len: n, degree });
        }
        if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
            return Err(SeasonalCycleError::FitError(format!(
                "non-finite value {} at index {idx}",
                values[idx]
            )));
        }

        let n_coef = degree + 1;
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let mut design = DMatrix::from_fn(n, n_coef, |i, j| (i as f64).powi(j as i32));

        let scales: Vec<f64> = design
            .column_iter()
            .map(|col| {
                let norm = col.norm();
                if norm > 0.0 {
                    norm
                } else {
                    1.0
                }
            })
            .collect();
        for (j, &scale) in scales.iter().enumerate() {
            design.column_mut(j).unscale_mut(scale);
        }

        let rhs = DVector::from_column_slice(values);
        let svd = design.svd(true, true);

        #[allow(clippy::cast_precision_loss)]
        let eps = svd.singular_values.max() * n as f64 * f64::EPSILON;
        let rank = svd.rank(eps);
        if rank < n_coef {
            warn!(rank, expected = n_coef, "trend fit is rank deficient");
        }

        let solution = svd
            .solve(&rhs, eps)
            .map_err(|e| SeasonalCycleError::FitError(e.to_string()))?;

        let coefficients: Vec<f64> = solution
            .iter()
            .zip(&scales)
            .map(|(c, scale)| c / scale)
            .collect();

        debug!(degree, ?coefficients, "fitted polynomial trend");

        Ok(Self {
            degree,
            coefficients,
        })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Coefficients in ascending power, `degree + 1` of them
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Evaluate the polynomial at index `x` (Horner's scheme)
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc.mul_add(x, c))
    }

    /// The trend evaluated at `0..n`
    #[allow(clippy::cast_precision_loss)]
    pub fn fitted_curve(&self, n: usize) -> Vec<f64> {
        (0..n).map(|i| self.evaluate(i as f64)).collect()
    }
}

/// Remove a polynomial trend of `degree`, preserving the series mean
///
/// # Errors
///
/// See [`TrendModel::fit`].
pub fn detrend(series: &TimeSeries, degree: usize) -> Result<TimeSeries> {
    detrend_with_trend(series, degree).map(|(detrended, _)| detrended)
}

/// Like [`detrend`], also returning the fitted trend
///
/// # Errors
///
/// See [`TrendModel::fit`].
pub fn detrend_with_trend(series: &TimeSeries, degree: usize) -> Result<(TimeSeries, TrendModel)> {
    let trend = TrendModel::fit(series.values(), degree)?;
    let fitted = trend.fitted_curve(series.len());
    let mean = series.mean();

    let values: Vec<f64> = series
        .values()
        .iter()
        .zip(&fitted)
        .map(|(value, fit)| value - fit + mean)
        .collect();

    Ok((series.with_values(values), trend))
}
