use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ElasticityError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Column '{column}' not found in input header")]
    MissingColumn { column: String },

    #[error("Unknown category: {category}")]
    UnknownCategory { category: String },

    #[error("Simulation error: {0}")]
    SimulationError(#[from] SimulationError),

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

pub type Result<T> = std::result::Result<T, ElasticityError>;

/// Category-local estimation failures. One category failing never aborts the
/// others; callers receive these per category.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimationError {
    #[error("insufficient data: {observations} observations, at least {required} required")]
    InsufficientData { observations: usize, required: usize },

    #[error("degenerate input: every observation has price {price}")]
    DegenerateInput { price: f64 },

    #[error("non-positive {field} value {value} cannot be log-transformed")]
    NonPositiveValue { field: String, value: f64 },
}

impl EstimationError {
    pub fn kind(&self) -> &'static str {
        match self {
            EstimationError::InsufficientData { .. } => "InsufficientData",
            EstimationError::DegenerateInput { .. } => "DegenerateInput",
            EstimationError::NonPositiveValue { .. } => "NonPositiveValue",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("elasticity must be finite, got {0}")]
    NonFiniteElasticity(f64),

    #[error("price change must be finite and greater than -100%, got {0}%")]
    InvalidPriceChange(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Input,
    Configuration,
    Analysis,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ElasticityError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ElasticityError::IoError(_) => ErrorCategory::Io,
            ElasticityError::CsvError(_) | ElasticityError::MissingColumn { .. } => {
                ErrorCategory::Input
            }
            ElasticityError::ConfigError { .. }
            | ElasticityError::InvalidConfigValueError { .. }
            | ElasticityError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ElasticityError::UnknownCategory { .. }
            | ElasticityError::SimulationError(_)
            | ElasticityError::ProcessingError { .. }
            | ElasticityError::ValidationError { .. } => ErrorCategory::Analysis,
            ElasticityError::ZipError(_) | ElasticityError::SerializationError(_) => {
                ErrorCategory::Output
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ElasticityError::UnknownCategory { .. } | ElasticityError::SimulationError(_) => {
                ErrorSeverity::Low
            }
            ElasticityError::ValidationError { .. } | ElasticityError::ProcessingError { .. } => {
                ErrorSeverity::Medium
            }
            ElasticityError::ConfigError { .. }
            | ElasticityError::InvalidConfigValueError { .. }
            | ElasticityError::MissingConfigError { .. }
            | ElasticityError::MissingColumn { .. }
            | ElasticityError::CsvError(_) => ErrorSeverity::High,
            ElasticityError::IoError(_)
            | ElasticityError::ZipError(_)
            | ElasticityError::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ElasticityError::IoError(_) => {
                "Check that the input file exists and the output directory is writable".to_string()
            }
            ElasticityError::CsvError(_) => {
                "Make sure the input is a comma-separated file with a header row".to_string()
            }
            ElasticityError::MissingColumn { column } => format!(
                "Map the column explicitly (e.g. --price-col) or add '{}' to the input header",
                column
            ),
            ElasticityError::ConfigError { .. }
            | ElasticityError::InvalidConfigValueError { .. }
            | ElasticityError::MissingConfigError { .. } => {
                "Review the configuration values and run again with --verbose".to_string()
            }
            ElasticityError::UnknownCategory { .. } => {
                "Use one of the categories listed in elasticity_results.csv".to_string()
            }
            ElasticityError::SimulationError(_) => {
                "Use a finite price change above -100%".to_string()
            }
            ElasticityError::ProcessingError { .. } | ElasticityError::ValidationError { .. } => {
                "Inspect the input data for empty categories or malformed values".to_string()
            }
            ElasticityError::ZipError(_) | ElasticityError::SerializationError(_) => {
                "Disable the bundle option or check free disk space".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Io => format!("File access failed: {}", self),
            ErrorCategory::Input => format!("Input data could not be read: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Analysis => format!("Analysis failed: {}", self),
            ErrorCategory::Output => format!("Report could not be written: {}", self),
        }
    }

    /// Process exit code derived from severity. `Low` is treated as success.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}
