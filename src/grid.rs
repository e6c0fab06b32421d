//! Gridded (time, lat, lon) fields and lat/lon bounding boxes

use crate::calendar::CalendarDate;
use crate::errors::{Result, SeasonalCycleError};
use ndarray::{Array1, Array3};
use serde::Serialize;
use std::fmt;

/// A scalar field indexed by (time, lat, lon)
///
/// All three axes are strictly monotonic. Latitude and longitude may run in
/// either direction; time must be increasing. Units are carried through
/// untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct GriddedSeries {
    variable: String,
    units: Option<String>,
    time: Vec<CalendarDate>,
    lat: Array1<f64>,
    lon: Array1<f64>,
    values: Array3<f64>,
}

impl GriddedSeries {
    /// Build a field, checking that the axes match the value shape and are monotonic
    ///
    /// # Errors
    ///
    /// Returns [`SeasonalCycleError::MalformedInput`] if the shape of `values`
    /// is not `(time.len(), lat.len(), lon.len())` or an axis is not strictly
    /// monotonic.
    pub fn new(
        variable: impl Into<String>,
        time: Vec<CalendarDate>,
        lat: Array1<f64>,
        lon: Array1<f64>,
        values: Array3<f64>,
    ) -> Result<Self> {
        let variable = variable.into();
        let expected = (time.len(), lat.len(), lon.len());
        if values.dim() != expected {
            return Err(SeasonalCycleError::MalformedInput {
                message: format!(
                    "Variable '{variable}' has shape {:?}, axes imply {expected:?}",
                    values.dim()
                ),
            });
        }

        if !time.windows(2).all(|w| w[0] < w[1]) {
            return Err(SeasonalCycleError::MalformedInput {
                message: "time axis is not strictly increasing".to_string(),
            });
        }
        check_coordinate_axis("lat", &lat)?;
        check_coordinate_axis("lon", &lon)?;

        Ok(Self {
            variable,
            units: None,
            time,
            lat,
            lon,
            values,
        })
    }

    /// Attach a units string
    #[must_use]
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    pub fn time(&self) -> &[CalendarDate] {
        &self.time
    }

    pub fn lat(&self) -> &Array1<f64> {
        &self.lat
    }

    pub fn lon(&self) -> &Array1<f64> {
        &self.lon
    }

    pub fn values(&self) -> &Array3<f64> {
        &self.values
    }

    /// (time, lat, lon) lengths
    pub fn dim(&self) -> (usize, usize, usize) {
        self.values.dim()
    }

    /// Number of grid points per time step
    pub fn n_points(&self) -> usize {
        self.lat.len() * self.lon.len()
    }
}

fn check_coordinate_axis(name: &str, axis: &Array1<f64>) -> Result<()> {
    if let Some(bad) = axis.iter().find(|v| !v.is_finite()) {
        return Err(SeasonalCycleError::MalformedInput {
            message: format!("{name} axis contains non-finite coordinate {bad}"),
        });
    }

    let ascending = axis.iter().zip(axis.iter().skip(1)).all(|(a, b)| a < b);
    let descending = axis.iter().zip(axis.iter().skip(1)).all(|(a, b)| a > b);
    if ascending || descending {
        Ok(())
    } else {
        Err(SeasonalCycleError::MalformedInput {
            message: format!("{name} axis is not strictly monotonic"),
        })
    }
}

/// Closed latitude/longitude intervals in the grid's own convention
///
/// Longitudes are compared as-is, so a 0–360 grid needs a 0–360 box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    /// # Errors
    ///
    /// Returns [`SeasonalCycleError::InvalidBoundingBox`] if a bound is not
    /// finite or a minimum exceeds its maximum.
    pub fn new(lat: (f64, f64), lon: (f64, f64)) -> Result<Self> {
        for (name, (min, max)) in [("latitude", lat), ("longitude", lon)] {
            if !min.is_finite() || !max.is_finite() {
                return Err(SeasonalCycleError::InvalidBoundingBox {
                    message: format!("{name} bounds must be finite, got {min} to {max}"),
                });
            }
            if min > max {
                return Err(SeasonalCycleError::InvalidBoundingBox {
                    message: format!("{name} minimum {min} exceeds maximum {max}"),
                });
            }
        }

        Ok(Self {
            lat_min: lat.0,
            lat_max: lat.1,
            lon_min: lon.0,
            lon_max: lon.1,
        })
    }

    pub fn contains_lat(&self, lat: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat)
    }

    pub fn contains_lon(&self, lon: f64) -> bool {
        (self.lon_min..=self.lon_max).contains(&lon)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Lat: {} - {}; Lon: {} - {}]",
            self.lat_min, self.lat_max, self.lon_min, self.lon_max
        )
    }
}
