//! Centralized error handling for the seasonal cycle pipeline
//!
//! Every stage of the pipeline returns [`Result`], so failures surface to the
//! caller with enough context to tell a bad bounding box from a bad file.

use std::fmt;

/// Main error type for seasonal cycle operations
#[derive(Debug)]
pub enum SeasonalCycleError {
    /// The bounding box selected zero grid points
    EmptyRegion {
        lat: (f64, f64),
        lon: (f64, f64),
    },

    /// Too few time steps for the requested polynomial degree
    InsufficientData { len: usize, degree: usize },

    /// The least-squares trend fit could not be computed
    FitError(String),

    /// Input grid lacks required axes, coordinates or has a bad shape
    MalformedInput { message: String },

    /// Bounding box with non-finite or inverted bounds
    InvalidBoundingBox { message: String },

    /// Variable not found in NetCDF file
    VariableNotFound { var: String },

    /// CF time axis could not be decoded
    TimeDecode { message: String },

    /// NetCDF file operation errors
    NetCDFError(netcdf::Error),

    /// I/O operation errors
    IoError(std::io::Error),

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),

    /// JSON serialization errors
    JsonError(serde_json::Error),

    /// Thread pool configuration error
    ThreadPoolError(String),
}

impl fmt::Display for SeasonalCycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRegion { lat, lon } => write!(
                f,
                "Bounding box [lat {} to {}, lon {} to {}] selects no grid points",
                lat.0, lat.1, lon.0, lon.1
            ),
            Self::InsufficientData { len, degree } => write!(
                f,
                "Insufficient data: {len} time steps cannot support a degree {degree} polynomial fit"
            ),
            Self::FitError(msg) => write!(f, "Trend fit error: {msg}"),
            Self::MalformedInput { message } => write!(f, "Malformed input: {message}"),
            Self::InvalidBoundingBox { message } => write!(f, "Invalid bounding box: {message}"),
            Self::VariableNotFound { var } => write!(f, "Variable '{var}' not found in file"),
            Self::TimeDecode { message } => write!(f, "Time axis decode error: {message}"),
            Self::NetCDFError(e) => write!(f, "NetCDF error: {e}"),
            Self::IoError(e) => write!(f, "I/O error: {e}"),
            Self::ArrayError(e) => write!(f, "Array error: {e}"),
            Self::JsonError(e) => write!(f, "JSON error: {e}"),
            Self::ThreadPoolError(msg) => write!(f, "Thread pool error: {msg}"),
        }
    }
}

impl std::error::Error for SeasonalCycleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NetCDFError(e) => Some(e),
            Self::IoError(e) => Some(e),
            Self::ArrayError(e) => Some(e),
            Self::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<netcdf::Error> for SeasonalCycleError {
    fn from(error: netcdf::Error) -> Self {
        Self::NetCDFError(error)
    }
}

impl From<std::io::Error> for SeasonalCycleError {
    fn from(error: std::io::Error) -> Self {
        Self::IoError(error)
    }
}

impl From<ndarray::ShapeError> for SeasonalCycleError {
    fn from(error: ndarray::ShapeError) -> Self {
        Self::ArrayError(error)
    }
}

impl From<serde_json::Error> for SeasonalCycleError {
    fn from(error: serde_json::Error) -> Self {
        Self::JsonError(error)
    }
}

/// Result type alias for seasonal cycle operations
pub type Result<T> = std::result::Result<T, SeasonalCycleError>;
