//! Command-line interface options using `clap`
//!
//! Bounds can be given as `--lat MIN MAX --lon MIN MAX`, as four positional
//! values `LON_MIN LON_MAX LAT_MIN LAT_MAX`, or omitted to use the default
//! box. All three end up as the same [`PipelineConfig`].

use crate::errors::Result;
use crate::grid::BoundingBox;
use crate::netcdf_io::LoadOptions;
use crate::parallel::ParallelConfig;
use crate::pipeline::{PipelineConfig, DEFAULT_BOUNDS};
use crate::reduce::Weighting;
use crate::report::ReportStyle;
use clap::Parser;
use std::path::PathBuf;

/// Compute the detrended mean seasonal cycle of a gridded NetCDF variable
#[derive(Parser, Debug)]
#[command(
    version,
    name = "seasonal_cycle",
    about = "Computes the mean seasonal cycle of a gridded field over a latitude/longitude box"
)]
pub struct Args {
    /// Bounds as LON_MIN LON_MAX LAT_MIN LAT_MAX (longitude 0-360)
    #[arg(
        num_args = 4,
        value_names = ["LON_MIN", "LON_MAX", "LAT_MIN", "LAT_MAX"],
        allow_negative_numbers = true,
        conflicts_with_all = ["lat", "lon"]
    )]
    pub bounds: Option<Vec<f64>>,

    /// Path to the NetCDF file
    #[arg(short, long, default_value = "data/CESM_LE.TS.002.1990-01.2000-12.nc")]
    pub file: PathBuf,

    /// Variable to analyse
    #[arg(long = "var", default_value = "TS")]
    pub variable: String,

    /// Name of the time dimension
    #[arg(long, default_value = "time")]
    pub time_dim: String,

    /// Latitude bounds separated by a space
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true, requires = "lon")]
    pub lat: Option<Vec<f64>>,

    /// Longitude bounds (0-360) separated by a space
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true, requires = "lat")]
    pub lon: Option<Vec<f64>>,

    /// Degree of the polynomial trend to remove
    #[arg(short, long, default_value_t = crate::detrend::DEFAULT_DEGREE)]
    pub degree: usize,

    /// Weight grid points by cos(latitude) instead of equally
    #[arg(long, default_value_t = false)]
    pub area_weighted: bool,

    /// Path to save the result as NetCDF
    #[arg(long)]
    pub output_netcdf: Option<PathBuf>,

    /// Path to save the result as JSON
    #[arg(long)]
    pub output_json: Option<PathBuf>,

    /// Also report the regional, trend and detrended time series
    #[arg(long, default_value_t = false)]
    pub include_series: bool,

    /// Decimal places in the printed table
    #[arg(long, default_value_t = 3)]
    pub precision: usize,

    /// Enable verbose output.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Number of threads to use for parallel processing. Defaults to number of CPU cores.
    #[arg(short = 't', long)]
    pub threads: Option<usize>,
}

impl Args {
    /// The bounding box from whichever entry mode was used
    ///
    /// # Errors
    ///
    /// Returns [`SeasonalCycleError::InvalidBoundingBox`] for inverted or
    /// non-finite bounds.
    ///
    /// [`SeasonalCycleError::InvalidBoundingBox`]: crate::errors::SeasonalCycleError::InvalidBoundingBox
    pub fn bounding_box(&self) -> Result<BoundingBox> {
        match (&self.bounds, &self.lat, &self.lon) {
            (Some(b), _, _) => BoundingBox::new((b[2], b[3]), (b[0], b[1])),
            (None, Some(lat), Some(lon)) => BoundingBox::new((lat[0], lat[1]), (lon[0], lon[1])),
            _ => Ok(DEFAULT_BOUNDS),
        }
    }

    /// # Errors
    ///
    /// See [`Args::bounding_box`].
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let weighting = if self.area_weighted {
            Weighting::CosLatitude
        } else {
            Weighting::Unweighted
        };
        Ok(PipelineConfig::new(self.bounding_box()?)
            .with_degree(self.degree)
            .with_weighting(weighting))
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            variable: self.variable.clone(),
            time_dim: self.time_dim.clone(),
        }
    }

    pub fn report_style(&self) -> ReportStyle {
        ReportStyle {
            precision: self.precision,
            include_series: self.include_series,
            ..ReportStyle::default()
        }
    }

    pub fn parallel_config(&self) -> ParallelConfig {
        ParallelConfig::new(self.threads)
    }
}
