//! The seasonal cycle pipeline
//!
//! select → reduce → detrend → extract_cycle, driven by one [`PipelineConfig`].
//! Every entry point (flags, positional bounds, the built-in default box)
//! builds a config and calls [`run`].

use crate::climatology::{extract_cycle, SeasonalCycle};
use crate::detrend::{detrend_with_trend, TrendModel, DEFAULT_DEGREE};
use crate::errors::Result;
use crate::grid::{BoundingBox, GriddedSeries};
use crate::reduce::{reduce_with, Weighting};
use crate::region::select;
use crate::series::TimeSeries;
use serde::Serialize;
use tracing::info;

/// Equatorial Pacific box (lat −5–5, lon 180–240) used when no bounds are given
pub const DEFAULT_BOUNDS: BoundingBox = BoundingBox {
    lat_min: -5.0,
    lat_max: 5.0,
    lon_min: 180.0,
    lon_max: 240.0,
};

/// The only tunables the pipeline depends on
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PipelineConfig {
    pub bounds: BoundingBox,
    pub degree: usize,
    pub weighting: Weighting,
}

impl PipelineConfig {
    /// Config for `bounds` with the default degree and no area weighting
    #[must_use]
    pub fn new(bounds: BoundingBox) -> Self {
        Self {
            bounds,
            degree: DEFAULT_DEGREE,
            weighting: Weighting::Unweighted,
        }
    }

    #[must_use]
    pub fn with_degree(mut self, degree: usize) -> Self {
        self.degree = degree;
        self
    }

    #[must_use]
    pub fn with_weighting(mut self, weighting: Weighting) -> Self {
        self.weighting = weighting;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BOUNDS)
    }
}

/// Everything the pipeline produced, for reporting and export
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub config: PipelineConfig,
    pub variable: String,
    pub units: Option<String>,
    /// Number of grid points inside the box
    pub grid_points: usize,
    /// Spatial mean over the box, before detrending
    pub regional_mean: TimeSeries,
    pub trend: TrendModel,
    pub detrended: TimeSeries,
    pub cycle: SeasonalCycle,
}

/// Run the full pipeline over an in-memory field
///
/// # Errors
///
/// Propagates [`SeasonalCycleError::EmptyRegion`] from selection and
/// [`SeasonalCycleError::InsufficientData`] or
/// [`SeasonalCycleError::FitError`] from detrending.
///
/// [`SeasonalCycleError::EmptyRegion`]: crate::errors::SeasonalCycleError::EmptyRegion
/// [`SeasonalCycleError::InsufficientData`]: crate::errors::SeasonalCycleError::InsufficientData
/// [`SeasonalCycleError::FitError`]: crate::errors::SeasonalCycleError::FitError
pub fn run(field: &GriddedSeries, config: &PipelineConfig) -> Result<PipelineOutput> {
    let region = select(field, &config.bounds)?;
    info!(
        variable = field.variable(),
        grid_points = region.n_points(),
        "selected region {}",
        config.bounds
    );

    let regional_mean = reduce_with(&region, config.weighting);
    let (detrended, trend) = detrend_with_trend(&regional_mean, config.degree)?;
    let cycle = extract_cycle(&detrended);

    info!(
        time_steps = regional_mean.len(),
        months = cycle.len(),
        degree = config.degree,
        "computed seasonal cycle"
    );

    Ok(PipelineOutput {
        config: *config,
        variable: field.variable().to_string(),
        units: field.units().map(str::to_string),
        grid_points: region.n_points(),
        regional_mean,
        trend,
        detrended,
        cycle,
    })
}
