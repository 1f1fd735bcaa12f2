use thiserror::Error;

#[derive(Error, Debug)]
pub enum SizingError {
    #[error("Catalog request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Catalog error: {message}")]
    CatalogError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("Version conflict: expected {expected}, found {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    #[error("Results were computed from sector version {basis} but the sector is at version {current}")]
    StaleResults { basis: u64, current: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Catalog,
    Concurrency,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SizingError {
    pub fn validation(message: impl Into<String>) -> Self {
        SizingError::ValidationError {
            message: message.into(),
        }
    }

    pub fn catalog(message: impl Into<String>) -> Self {
        SizingError::CatalogError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SizingError::ValidationError { .. } | SizingError::NotFound { .. } => {
                ErrorCategory::Input
            }
            SizingError::ConfigValidationError { .. }
            | SizingError::InvalidConfigValueError { .. }
            | SizingError::MissingConfigError { .. } => ErrorCategory::Configuration,
            SizingError::ApiError(_) | SizingError::CsvError(_) | SizingError::CatalogError { .. } => {
                ErrorCategory::Catalog
            }
            SizingError::VersionConflict { .. } | SizingError::StaleResults { .. } => {
                ErrorCategory::Concurrency
            }
            SizingError::IoError(_) | SizingError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Concurrency => ErrorSeverity::Medium,
            ErrorCategory::Catalog => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Whether retrying the same request can succeed without changing its inputs.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SizingError::ApiError(_)
                | SizingError::VersionConflict { .. }
                | SizingError::StaleResults { .. }
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SizingError::ValidationError { .. } => {
                "Check that the sector has at least one cable group and a reserve between 0 and 100"
            }
            SizingError::ConfigValidationError { .. }
            | SizingError::InvalidConfigValueError { .. }
            | SizingError::MissingConfigError { .. } => {
                "Review the configuration file and fix the reported field"
            }
            SizingError::ApiError(_) | SizingError::CatalogError { .. } => {
                "Verify the catalog endpoint is reachable and returns a JSON list of trays"
            }
            SizingError::CsvError(_) => "Check the catalog CSV headers and numeric columns",
            SizingError::NotFound { .. } => "Check the identifier and try again",
            SizingError::VersionConflict { .. } | SizingError::StaleResults { .. } => {
                "Reload the sector and run the calculation again"
            }
            SizingError::IoError(_) => "Check file paths and permissions",
            SizingError::SerializationError(_) => "Check the input data format",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SizingError::ValidationError { message } => format!("The sector is incomplete: {}", message),
            SizingError::CatalogError { .. } | SizingError::ApiError(_) => {
                format!("The tray catalog could not be read ({})", self)
            }
            SizingError::VersionConflict { .. } | SizingError::StaleResults { .. } => {
                "The sector changed while the calculation was running".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SizingError>;
