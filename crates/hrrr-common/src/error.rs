//! Error types for HRRR metadata resolution.

use thiserror::Error;

/// Result type alias using HrrrError.
pub type HrrrResult<T> = Result<T, HrrrError>;

/// Primary error type for forecast calendar and inventory resolution.
#[derive(Debug, Error)]
pub enum HrrrError {
    // === Calendar Errors ===
    #[error("Forecast hour {forecast_hour} is not valid for {context} (valid range: 0-{max})")]
    OutOfRange {
        forecast_hour: i64,
        max: u32,
        context: String,
    },

    #[error("{hour} is not a valid cycle run hour for {region}. Please select one of {valid_hours}")]
    InvalidCycleHour {
        region: String,
        hour: u32,
        valid_hours: String,
    },

    // === Retrieval Errors ===
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    // === Inventory Errors ===
    #[error("Malformed index at line {line}: {message}")]
    MalformedIndex { line: usize, message: String },

    #[error("Unrecognized forecast valid pattern: '{0}'")]
    PatternParse(String),

    #[error("Duplicate layer key: {0}")]
    DuplicateLayerKey(String),

    #[error("No reference inventory row {row} in table {table}")]
    InventoryMismatch { row: u32, table: String },

    // === Input / Configuration Errors ===
    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HrrrError {
    /// True for the upstream-resource-absent condition that batch
    /// generation treats as "skip this item".
    pub fn is_not_found(&self) -> bool {
        matches!(self, HrrrError::NotFound(_))
    }

    /// Short machine-friendly label, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            HrrrError::OutOfRange { .. } => "out_of_range",
            HrrrError::InvalidCycleHour { .. } => "invalid_cycle_hour",
            HrrrError::NotFound(_) => "not_found",
            HrrrError::Http(_) => "http",
            HrrrError::MalformedIndex { .. } => "malformed_index",
            HrrrError::PatternParse(_) => "pattern_parse",
            HrrrError::DuplicateLayerKey(_) => "duplicate_layer_key",
            HrrrError::InventoryMismatch { .. } => "inventory_mismatch",
            HrrrError::InvalidParameter { .. } => "invalid_parameter",
            HrrrError::InvalidConfig(_) => "invalid_config",
            HrrrError::Io(_) => "io",
            HrrrError::Json(_) => "json",
        }
    }

    pub(crate) fn invalid_parameter(param: &str, message: impl Into<String>) -> Self {
        HrrrError::InvalidParameter {
            param: param.to_string(),
            message: message.into(),
        }
    }
}
