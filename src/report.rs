//! Presentation of pipeline results
//!
//! Styling is an explicit [`ReportStyle`] value handed to every renderer.

use crate::calendar::CalendarDate;
use crate::climatology::month_abbreviation;
use crate::errors::Result;
use crate::grid::BoundingBox;
use crate::pipeline::PipelineOutput;
use crate::reduce::Weighting;
use serde::Serialize;
use std::fmt::Write as _;
use std::{fs, path::Path};

/// How a seasonal cycle is titled, labelled and drawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportStyle {
    /// First title line; the bounding box goes on the second
    pub title: String,
    /// Value axis label; the variable's units are appended when known
    pub value_label: String,
    /// Decimal places for printed values
    pub precision: usize,
    /// Width in characters of the longest bar in the text chart
    pub bar_width: usize,
    /// Include the per-time-step series in text and JSON output
    pub include_series: bool,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            title: "Seasonal Cycle of Surface Temperature".to_string(),
            value_label: "Surface Temperature".to_string(),
            precision: 3,
            bar_width: 40,
            include_series: false,
        }
    }
}

impl ReportStyle {
    /// Two-line title with the bounding box
    pub fn title_for(&self, bounds: &BoundingBox) -> String {
        format!("{}\n{bounds}", self.title)
    }

    /// Value label with units, e.g. `Surface Temperature [K]`
    pub fn label_for(&self, units: Option<&str>) -> String {
        match units {
            Some(units) => format!("{} [{units}]", self.value_label),
            None => self.value_label.clone(),
        }
    }
}

/// One month of the serialized report
#[derive(Debug, Clone, Serialize)]
pub struct MonthRow {
    pub month: u32,
    pub name: &'static str,
    pub mean: f64,
    pub count: usize,
}

/// One time step of the serialized report
#[derive(Debug, Clone, Serialize)]
pub struct SeriesRow {
    pub time: CalendarDate,
    pub regional_mean: f64,
    pub trend: f64,
    pub detrended: f64,
}

/// Serializable summary of a pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub title: String,
    pub variable: String,
    pub units: Option<String>,
    pub bounds: BoundingBox,
    pub degree: usize,
    pub weighting: Weighting,
    pub grid_points: usize,
    pub time_steps: usize,
    pub trend_coefficients: Vec<f64>,
    pub months: Vec<MonthRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<Vec<SeriesRow>>,
}

impl CycleReport {
    pub fn new(output: &PipelineOutput, style: &ReportStyle) -> Self {
        let months = output
            .cycle
            .iter()
            .map(|m| MonthRow {
                month: m.month,
                name: month_abbreviation(m.month).unwrap_or("?"),
                mean: m.mean,
                count: m.count,
            })
            .collect();

        let series = style.include_series.then(|| {
            let trend = output.trend.fitted_curve(output.regional_mean.len());
            output
                .regional_mean
                .iter()
                .zip(output.detrended.values())
                .zip(trend)
                .map(|(((time, regional_mean), &detrended), trend)| SeriesRow {
                    time,
                    regional_mean,
                    trend,
                    detrended,
                })
                .collect()
        });

        Self {
            title: style.title_for(&output.config.bounds),
            variable: output.variable.clone(),
            units: output.units.clone(),
            bounds: output.config.bounds,
            degree: output.config.degree,
            weighting: output.config.weighting,
            grid_points: output.grid_points,
            time_steps: output.regional_mean.len(),
            trend_coefficients: output.trend.coefficients().to_vec(),
            months,
            series,
        }
    }
}

/// Render the cycle as a table with a horizontal bar per month
pub fn render_text(output: &PipelineOutput, style: &ReportStyle) -> String {
    let precision = style.precision;
    let mut out = String::new();

    let _ = writeln!(out, "{}", style.title_for(&output.config.bounds));
    let _ = writeln!(
        out,
        "{} | {} grid points | {} time steps | detrend degree {}",
        output.variable,
        output.grid_points,
        output.regional_mean.len(),
        output.config.degree
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Month  {:>12}  Count", style.label_for(output.units.as_deref()));

    let extremes = output.cycle.extremes();
    for m in output.cycle.iter() {
        let bar_len = match extremes {
            Some((lo, hi)) if m.mean.is_finite() && hi.mean > lo.mean => {
                let frac = (m.mean - lo.mean) / (hi.mean - lo.mean);
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
                let len = (frac * style.bar_width as f64).round() as usize;
                len.max(1)
            }
            Some(_) if m.mean.is_finite() => style.bar_width,
            _ => 0,
        };
        let _ = writeln!(
            out,
            "{:<5}  {:>12.precision$}  {:>5}  {}",
            month_abbreviation(m.month).unwrap_or("?"),
            m.mean,
            m.count,
            "█".repeat(bar_len)
        );
    }

    if let Some((lo, hi)) = extremes {
        let _ = writeln!(
            out,
            "\nMinimum {} ({:.precision$}), maximum {} ({:.precision$}), amplitude {:.precision$}",
            month_abbreviation(lo.month).unwrap_or("?"),
            lo.mean,
            month_abbreviation(hi.month).unwrap_or("?"),
            hi.mean,
            hi.mean - lo.mean
        );
    }

    if style.include_series {
        let _ = writeln!(out, "\n{:<10}  {:>12}  {:>12}  {:>12}", "Time", "Regional", "Trend", "Detrended");
        let trend = output.trend.fitted_curve(output.regional_mean.len());
        for (((time, value), detrended), fit) in output
            .regional_mean
            .iter()
            .zip(output.detrended.values())
            .zip(&trend)
        {
            let _ = writeln!(
                out,
                "{time}  {value:>12.precision$}  {fit:>12.precision$}  {detrended:>12.precision$}"
            );
        }
    }

    out
}

/// Pretty-printed JSON report
///
/// # Errors
///
/// Returns [`SeasonalCycleError::JsonError`] if serialization fails.
///
/// [`SeasonalCycleError::JsonError`]: crate::errors::SeasonalCycleError::JsonError
pub fn to_json(output: &PipelineOutput, style: &ReportStyle) -> Result<String> {
    Ok(serde_json::to_string_pretty(&CycleReport::new(output, style))?)
}

/// Write the JSON report to `path`, replacing any existing file
///
/// # Errors
///
/// Fails on serialization or I/O errors.
pub fn write_json(output: &PipelineOutput, style: &ReportStyle, path: &Path) -> Result<()> {
    fs::write(path, to_json(output, style)?)?;
    Ok(())
}
