//! Spatial reduction: collapse (lat, lon) to one value per time step

use crate::grid::GriddedSeries;
use crate::series::TimeSeries;
use ndarray::Axis;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

/// How grid points are weighted when averaging over the region
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Weighting {
    /// Every grid point counts equally, regardless of latitude
    #[default]
    Unweighted,
    /// Points weighted by cos(latitude), approximating grid-cell area
    CosLatitude,
}

impl Weighting {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unweighted => "unweighted",
            Self::CosLatitude => "cos-latitude",
        }
    }
}

/// Unweighted spatial mean of every time step
///
/// The result has one value per time step, in time order. A time step with
/// no finite grid values (including an empty spatial domain) yields NaN.
pub fn reduce(field: &GriddedSeries) -> TimeSeries {
    reduce_with(field, Weighting::Unweighted)
}

/// Spatial mean of every time step using the given weighting
pub fn reduce_with(field: &GriddedSeries, weighting: Weighting) -> TimeSeries {
    let lat_weights: Vec<f64> = match weighting {
        Weighting::Unweighted => vec![1.0; field.lat().len()],
        Weighting::CosLatitude => field
            .lat()
            .iter()
            .map(|lat| lat.to_radians().cos().max(0.0))
            .collect(),
    };

    let values = field.values();
    let (n_time, _, _) = field.dim();

    debug!(
        time_steps = n_time,
        grid_points = field.n_points(),
        weighting = weighting.as_str(),
        threads = rayon::current_num_threads(),
        "reducing region to a time series"
    );

    let means: Vec<f64> = (0..n_time)
        .into_par_iter()
        .map(|t| {
            let slab = values.index_axis(Axis(0), t);

            // Accumulate sequentially within a step so results don't depend on the pool
            let mut sum = 0.0_f64;
            let mut weight_sum = 0.0_f64;
            for (row, &w) in slab.outer_iter().zip(&lat_weights) {
                for &value in row {
                    if value.is_finite() {
                        sum += w * value;
                        weight_sum += w;
                    }
                }
            }

            if weight_sum > 0.0 {
                sum / weight_sum
            } else {
                f64::NAN
            }
        })
        .collect();

    TimeSeries::from_parts(field.time().to_vec(), means)
}
