//! NetCDF loading and writing
//!
//! [`load_gridded_series`] turns a (time, lat, lon) variable into a
//! [`GriddedSeries`]: fill values become NaN, packed values are unpacked and
//! the CF time axis is decoded. [`NetCDFWriter`] writes pipeline results to a
//! new file, carrying over the source variable's attributes.

use crate::calendar::{CalendarDate, CalendarKind, TimeUnits};
use crate::errors::{Result, SeasonalCycleError};
use crate::grid::GriddedSeries;
use crate::pipeline::PipelineOutput;
use chrono::Utc;
use ndarray::{Array1, ArrayD, Ix3};
use netcdf::{AttributeValue, File, Variable};
use std::{fs, path::Path};
use tracing::{debug, warn};

const LAT_NAMES: [&str; 2] = ["lat", "latitude"];
const LON_NAMES: [&str; 2] = ["lon", "longitude"];

/// Attributes that describe packing or masking of the source data and no
/// longer apply once values are decoded to f64
const DECODED_ATTRIBUTES: [&str; 4] = ["_FillValue", "missing_value", "scale_factor", "add_offset"];

/// Which variable to load and what its time dimension is called
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub variable: String,
    pub time_dim: String,
}

impl LoadOptions {
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            time_dim: "time".to_string(),
        }
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::new("TS")
    }
}

/// Open `path` and load the configured variable
///
/// # Errors
///
/// See [`load_gridded_series`]; also fails if the file cannot be opened.
pub fn open_gridded_series(path: &Path, options: &LoadOptions) -> Result<GriddedSeries> {
    let file = netcdf::open(path)?;
    load_gridded_series(&file, options)
}

/// Load a (time, lat, lon) variable from an open NetCDF file
///
/// Dimensions may appear in any order; the values are transposed to
/// (time, lat, lon). `lat`/`latitude` and `lon`/`longitude` are accepted.
///
/// # Errors
///
/// - [`SeasonalCycleError::VariableNotFound`] if the variable is missing
/// - [`SeasonalCycleError::MalformedInput`] if it is not three-dimensional,
///   lacks a time/lat/lon dimension or a coordinate variable, or the time
///   coordinate has no `units`
/// - [`SeasonalCycleError::TimeDecode`] if the time axis cannot be decoded
pub fn load_gridded_series(file: &File, options: &LoadOptions) -> Result<GriddedSeries> {
    let var = file
        .variable(&options.variable)
        .ok_or_else(|| SeasonalCycleError::VariableNotFound {
            var: options.variable.clone(),
        })?;

    let dim_names: Vec<String> = var
        .dimensions()
        .iter()
        .map(|d| d.name().to_string())
        .collect();

    if dim_names.len() != 3 {
        return Err(SeasonalCycleError::MalformedInput {
            message: format!(
                "Variable '{}' has dimensions [{}], expected (time, lat, lon)",
                options.variable,
                dim_names.join(", ")
            ),
        });
    }

    let time_axis = find_axis(&dim_names, &[options.time_dim.as_str()], &options.variable)?;
    let lat_axis = find_axis(&dim_names, &LAT_NAMES, &options.variable)?;
    let lon_axis = find_axis(&dim_names, &LON_NAMES, &options.variable)?;

    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    debug!(variable = %options.variable, ?shape, "loading data array");

    let raw = var.get_values::<f64, _>(..)?;
    let mut values = ArrayD::from_shape_vec(shape, raw)?
        .permuted_axes(vec![time_axis, lat_axis, lon_axis])
        .into_dimensionality::<Ix3>()?
        .as_standard_layout()
        .into_owned();

    let fill_values: Vec<f64> = ["_FillValue", "missing_value"]
        .iter()
        .filter_map(|name| numeric_attribute(&var, name).transpose())
        .collect::<Result<_>>()?;
    let scale = numeric_attribute(&var, "scale_factor")?.unwrap_or(1.0);
    let offset = numeric_attribute(&var, "add_offset")?.unwrap_or(0.0);

    values.mapv_inplace(|v| {
        if fill_values.iter().any(|&fill| v == fill) {
            f64::NAN
        } else {
            v.mul_add(scale, offset)
        }
    });

    let lat = read_coordinate(file, &dim_names[lat_axis])?;
    let lon = read_coordinate(file, &dim_names[lon_axis])?;
    let time = read_time_axis(file, &dim_names[time_axis])?;

    let field = GriddedSeries::new(options.variable.clone(), time, lat, lon, values)?;
    Ok(match string_attribute(&var, "units")? {
        Some(units) => field.with_units(units),
        None => field,
    })
}

fn find_axis(dim_names: &[String], candidates: &[&str], var_name: &str) -> Result<usize> {
    dim_names
        .iter()
        .position(|d| candidates.contains(&d.as_str()))
        .ok_or_else(|| SeasonalCycleError::MalformedInput {
            message: format!(
                "Variable '{var_name}' has no '{}' dimension (found [{}])",
                candidates.join("' or '"),
                dim_names.join(", ")
            ),
        })
}

fn coordinate_variable<'f>(file: &'f File, name: &str) -> Result<Variable<'f>> {
    let var = file
        .variable(name)
        .ok_or_else(|| SeasonalCycleError::MalformedInput {
            message: format!("Missing coordinate variable '{name}'"),
        })?;
    if var.dimensions().len() != 1 {
        return Err(SeasonalCycleError::MalformedInput {
            message: format!("Coordinate variable '{name}' is not one-dimensional"),
        });
    }
    Ok(var)
}

fn read_coordinate(file: &File, name: &str) -> Result<Array1<f64>> {
    let var = coordinate_variable(file, name)?;
    Ok(Array1::from(var.get_values::<f64, _>(..)?))
}

fn read_time_axis(file: &File, name: &str) -> Result<Vec<CalendarDate>> {
    let var = coordinate_variable(file, name)?;
    let units = string_attribute(&var, "units")?.ok_or_else(|| SeasonalCycleError::MalformedInput {
        message: format!("Time coordinate '{name}' has no 'units' attribute"),
    })?;
    let calendar = match string_attribute(&var, "calendar")? {
        Some(calendar) => calendar.parse()?,
        None => CalendarKind::Standard,
    };

    let offsets = var.get_values::<f64, _>(..)?;
    let decoder = TimeUnits::parse(&units, calendar)?;
    debug!(%units, ?calendar, steps = offsets.len(), "decoding time axis");
    decoder.decode_all(&offsets)
}

fn string_attribute(var: &Variable, name: &str) -> Result<Option<String>> {
    match var.attribute(name) {
        Some(attr) => match attr.value()? {
            AttributeValue::Str(s) => Ok(Some(s)),
            _ => Ok(None),
        },
        None => Ok(None),
    }
}

fn numeric_attribute(var: &Variable, name: &str) -> Result<Option<f64>> {
    let Some(attr) = var.attribute(name) else {
        return Ok(None);
    };
    #[allow(clippy::cast_precision_loss)]
    let value = match attr.value()? {
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Float(v) => Some(f64::from(v)),
        AttributeValue::Int(v) => Some(f64::from(v)),
        AttributeValue::Short(v) => Some(f64::from(v)),
        AttributeValue::Schar(v) => Some(f64::from(v)),
        AttributeValue::Uchar(v) => Some(f64::from(v)),
        AttributeValue::Ushort(v) => Some(f64::from(v)),
        AttributeValue::Uint(v) => Some(f64::from(v)),
        AttributeValue::Longlong(v) => Some(v as f64),
        AttributeValue::Ulonglong(v) => Some(v as f64),
        AttributeValue::Doubles(v) => v.first().copied(),
        AttributeValue::Floats(v) => v.first().copied().map(f64::from),
        _ => None,
    };
    Ok(value)
}

/// Writes pipeline results to a new NetCDF file
pub struct NetCDFWriter<'a> {
    input_file: &'a File,
    output_path: &'a Path,
}

impl<'a> NetCDFWriter<'a> {
    /// `input_file` is the source the attributes are copied from
    pub fn new(input_file: &'a File, output_path: &'a Path) -> Self {
        Self {
            input_file,
            output_path,
        }
    }

    /// Write the seasonal cycle, and with `include_series` the regional,
    /// trend and detrended time series
    ///
    /// The cycle is stored under the source variable's name along a `month`
    /// dimension, with the source variable's attributes.
    ///
    /// # Errors
    ///
    /// Fails if the source variable is gone from the input file or any
    /// NetCDF operation fails.
    pub fn write_output(&self, output: &PipelineOutput, include_series: bool) -> Result<()> {
        if self.output_path.exists() {
            fs::remove_file(self.output_path)?;
        }

        let orig_var = self
            .input_file
            .variable(&output.variable)
            .ok_or_else(|| SeasonalCycleError::VariableNotFound {
                var: output.variable.clone(),
            })?;

        let mut file = netcdf::create(self.output_path)?;
        file.add_dimension("month", output.cycle.len())?;

        {
            let months: Vec<i32> = output
                .cycle
                .months()
                .into_iter()
                .map(|m| i32::try_from(m).unwrap_or(i32::MAX))
                .collect();
            let mut month_var = file.add_variable::<i32>("month", &["month"])?;
            month_var.put_attribute("long_name", "calendar month")?;
            month_var.put_values(&months, ..)?;
        }

        {
            let mut cycle_var = file.add_variable::<f64>(&output.variable, &["month"])?;
            copy_attributes(&orig_var, &mut cycle_var)?;
            cycle_var.put_attribute("cell_methods", "time: mean within months time: mean over years")?;
            cycle_var.put_values(&output.cycle.means(), ..)?;
        }

        {
            let counts: Vec<i32> = output
                .cycle
                .iter()
                .map(|m| i32::try_from(m.count).unwrap_or(i32::MAX))
                .collect();
            let mut count_var = file.add_variable::<i32>("sample_count", &["month"])?;
            count_var.put_attribute("long_name", "number of time steps averaged per month")?;
            count_var.put_values(&counts, ..)?;
        }

        if include_series {
            self.write_series(&mut file, &orig_var, output)?;
        }

        let bounds = &output.config.bounds;
        file.add_attribute("lat_bounds", vec![bounds.lat_min, bounds.lat_max])?;
        file.add_attribute("lon_bounds", vec![bounds.lon_min, bounds.lon_max])?;
        file.add_attribute("detrend_degree", i32::try_from(output.config.degree).unwrap_or(i32::MAX))?;
        file.add_attribute("spatial_weighting", output.config.weighting.as_str())?;
        file.add_attribute(
            "history",
            format!("Created by seasonal_cycle on {}", Utc::now().to_rfc3339()),
        )?;

        Ok(())
    }

    fn write_series(
        &self,
        file: &mut netcdf::FileMut,
        orig_var: &Variable,
        output: &PipelineOutput,
    ) -> Result<()> {
        file.add_dimension("time", output.detrended.len())?;

        let years: Vec<i32> = output.detrended.times().iter().map(|t| t.year).collect();
        let months: Vec<i32> = output
            .detrended
            .times()
            .iter()
            .map(|t| i32::try_from(t.month).unwrap_or(i32::MAX))
            .collect();
        {
            let mut year_var = file.add_variable::<i32>("year", &["time"])?;
            year_var.put_values(&years, ..)?;
        }
        {
            let mut month_var = file.add_variable::<i32>("month_of_year", &["time"])?;
            month_var.put_values(&months, ..)?;
        }

        let trend = output.trend.fitted_curve(output.regional_mean.len());
        let series: [(&str, &str, &[f64]); 3] = [
            ("regional_mean", "spatial mean over the bounding box", output.regional_mean.values()),
            ("trend", "fitted polynomial trend", &trend),
            ("detrended", "detrended regional mean", output.detrended.values()),
        ];

        for (suffix, long_name, values) in series {
            let name = format!("{}_{suffix}", output.variable);
            let mut var = file.add_variable::<f64>(&name, &["time"])?;
            copy_attributes(orig_var, &mut var)?;
            var.put_attribute("long_name", long_name)?;
            if suffix == "trend" {
                var.put_attribute("polynomial_coefficients", output.trend.coefficients().to_vec())?;
            }
            var.put_values(values, ..)?;
        }

        Ok(())
    }
}

/// Copy attributes from the source variable, skipping packing/masking ones
fn copy_attributes(source: &Variable, target: &mut netcdf::VariableMut) -> Result<()> {
    for attr in source
        .attributes()
        .filter(|a| !DECODED_ATTRIBUTES.iter().any(|decoded| a.name() == *decoded))
    {
        match attr.value()? {
            AttributeValue::Str(val) => {
                target.put_attribute(attr.name(), val)?;
            }
            AttributeValue::Strs(vals) => {
                target.put_attribute(attr.name(), vals)?;
            }
            AttributeValue::Float(val) => {
                target.put_attribute(attr.name(), val)?;
            }
            AttributeValue::Floats(vals) => {
                target.put_attribute(attr.name(), vals)?;
            }
            AttributeValue::Double(val) => {
                target.put_attribute(attr.name(), val)?;
            }
            AttributeValue::Doubles(vals) => {
                target.put_attribute(attr.name(), vals)?;
            }
            AttributeValue::Int(val) => {
                target.put_attribute(attr.name(), val)?;
            }
            AttributeValue::Ints(vals) => {
                target.put_attribute(attr.name(), vals)?;
            }
            AttributeValue::Short(val) => {
                target.put_attribute(attr.name(), val)?;
            }
            AttributeValue::Shorts(vals) => {
                target.put_attribute(attr.name(), vals)?;
            }
            _ => {
                warn!(attribute = attr.name(), "skipped unsupported attribute type");
            }
        }
    }
    Ok(())
}
