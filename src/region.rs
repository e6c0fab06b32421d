//! Region selection: subset a gridded field to a lat/lon bounding box

use crate::errors::{Result, SeasonalCycleError};
use crate::grid::{BoundingBox, GriddedSeries};
use ndarray::{Array1, Axis};
use tracing::debug;

/// Keep the grid points whose latitude and longitude fall inside `bbox`
///
/// Bounds are inclusive and every time step is retained. The original axis
/// order is preserved, so descending latitude grids select correctly.
///
/// # Errors
///
/// Returns [`SeasonalCycleError::EmptyRegion`] when no latitude or no
/// longitude falls inside the box.
pub fn select(field: &GriddedSeries, bbox: &BoundingBox) -> Result<GriddedSeries> {
    let lat_idx = indices_within(field.lat(), |v| bbox.contains_lat(v));
    let lon_idx = indices_within(field.lon(), |v| bbox.contains_lon(v));

    if lat_idx.is_empty() || lon_idx.is_empty() {
        return Err(SeasonalCycleError::EmptyRegion {
            lat: (bbox.lat_min, bbox.lat_max),
            lon: (bbox.lon_min, bbox.lon_max),
        });
    }

    let values = field
        .values()
        .select(Axis(1), &lat_idx)
        .select(Axis(2), &lon_idx);
    let lat: Array1<f64> = field.lat().select(Axis(0), &lat_idx);
    let lon: Array1<f64> = field.lon().select(Axis(0), &lon_idx);

    debug!(
        lat_points = lat.len(),
        lon_points = lon.len(),
        "selected region {bbox}"
    );

    let selected = GriddedSeries::new(field.variable(), field.time().to_vec(), lat, lon, values)?;
    Ok(match field.units() {
        Some(units) => selected.with_units(units),
        None => selected,
    })
}

fn indices_within(axis: &Array1<f64>, keep: impl Fn(f64) -> bool) -> Vec<usize> {
    axis.iter()
        .enumerate()
        .filter_map(|(i, &v)| keep(v).then_some(i))
        .collect()
}
