//! seasonal_cycle: mean seasonal cycle of a gridded field over a lat/lon box
//!
//! Given a (time, lat, lon) field such as surface temperature from a climate
//! model, this crate averages it over a bounding box, removes a polynomial
//! trend and averages each calendar month across years.
//!
//! ## Pipeline
//!
//! 1. [`region::select`]: keep grid points inside a [`BoundingBox`]
//! 2. [`reduce::reduce`]: unweighted spatial mean per time step
//! 3. [`detrend::detrend`]: remove a degree-4 polynomial over the sample
//!    index, keeping the series mean
//! 4. [`climatology::extract_cycle`]: mean per calendar month
//!
//! [`pipeline::run`] chains the four stages from one [`PipelineConfig`].
//!
//! ## Module Organization
//!
//! - [`grid`], [`series`]: the data model
//! - [`calendar`]: CF time axis decoding (standard, noleap, 360_day, ...)
//! - [`netcdf_io`]: loading fields from NetCDF and writing results back
//! - [`report`]: text and JSON presentation driven by a [`ReportStyle`]
//! - [`parallel`]: Rayon pool configuration
//! - [`cli`]: command-line arguments
//! - [`errors`]: centralized error handling
//!
//! ## Usage
//!
//! ```rust,no_run
//! use seasonal_cycle::prelude::*;
//! use std::path::Path;
//!
//! let field = open_gridded_series(Path::new("data.nc"), &LoadOptions::new("TS")).unwrap();
//! let bounds = BoundingBox::new((-5.0, 5.0), (180.0, 240.0)).unwrap();
//! let output = run(&field, &PipelineConfig::new(bounds)).unwrap();
//!
//! for month in output.cycle.iter() {
//!     println!("{}: {:.2}", month.month, month.mean);
//! }
//! ```

pub mod calendar;
pub mod cli;
pub mod climatology;
pub mod detrend;
pub mod errors;
pub mod grid;
pub mod netcdf_io;
pub mod parallel;
pub mod pipeline;
pub mod reduce;
pub mod region;
pub mod report;
pub mod series;

pub use calendar::{CalendarDate, CalendarKind, TimeUnits};
pub use climatology::{extract_cycle, MonthlyMean, SeasonalCycle};
pub use detrend::{detrend, TrendModel, DEFAULT_DEGREE};
pub use errors::{Result, SeasonalCycleError};
pub use grid::{BoundingBox, GriddedSeries};
pub use pipeline::{PipelineConfig, PipelineOutput};
pub use reduce::{reduce, Weighting};
pub use region::select;
pub use report::ReportStyle;
pub use series::TimeSeries;

pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::calendar::CalendarDate;
    pub use crate::climatology::{extract_cycle, SeasonalCycle};
    pub use crate::detrend::{detrend, TrendModel};
    pub use crate::errors::{Result, SeasonalCycleError};
    pub use crate::grid::{BoundingBox, GriddedSeries};
    pub use crate::netcdf_io::{load_gridded_series, open_gridded_series, LoadOptions, NetCDFWriter};
    pub use crate::pipeline::{run, PipelineConfig, PipelineOutput};
    pub use crate::reduce::{reduce, reduce_with, Weighting};
    pub use crate::region::select;
    pub use crate::report::ReportStyle;
    pub use crate::series::TimeSeries;
}
