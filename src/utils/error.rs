use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API responded with status {status}: {body}")]
    ApiStatusError { status: u16, body: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("PDF rendering error: {message}")]
    PdfError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Required fields are missing or invalid: {}", fields.join(", "))]
    ValidationError { fields: Vec<String> },

    #[error("A sale can hold at most {max} line items")]
    LineItemLimitError { max: usize },

    #[error("Line item operation rejected: {message}")]
    LineItemError { message: String },

    #[error("Record not found: {id}")]
    NotFoundError { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Validation,
    Export,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LedgerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LedgerError::ApiError(_)
            | LedgerError::ApiStatusError { .. }
            | LedgerError::NotFoundError { .. } => ErrorCategory::Network,
            LedgerError::ConfigError { .. }
            | LedgerError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            LedgerError::ValidationError { .. }
            | LedgerError::LineItemLimitError { .. }
            | LedgerError::LineItemError { .. } => ErrorCategory::Validation,
            LedgerError::ZipError(_)
            | LedgerError::CsvError(_)
            | LedgerError::PdfError { .. }
            | LedgerError::SerializationError(_) => ErrorCategory::Export,
            LedgerError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Export => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            LedgerError::ApiError(_) => {
                "Check that the backend is running and reachable at the configured endpoint".to_string()
            }
            LedgerError::ApiStatusError { status, .. } if *status == 404 => {
                "Check the record identifier; it may already have been deleted".to_string()
            }
            LedgerError::ApiStatusError { .. } => {
                "Inspect the backend logs for the failing request".to_string()
            }
            LedgerError::NotFoundError { .. } => {
                "List the records to find a valid identifier".to_string()
            }
            LedgerError::ValidationError { fields } => {
                format!("Fill in the following fields: {}", fields.join(", "))
            }
            LedgerError::LineItemLimitError { max } => {
                format!("Remove a line item before adding another (limit {})", max)
            }
            LedgerError::LineItemError { .. } => {
                "A sale must keep at least one line item".to_string()
            }
            LedgerError::PdfError { .. } => {
                "Check the [pdf] fonts_dir and font_family settings".to_string()
            }
            LedgerError::ConfigError { .. } | LedgerError::InvalidConfigValueError { .. } => {
                "Review the configuration file and command line flags".to_string()
            }
            LedgerError::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            LedgerError::ZipError(_)
            | LedgerError::CsvError(_)
            | LedgerError::SerializationError(_) => {
                "Retry the export; report the issue if it persists".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not complete the request: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Validation => format!("The sale form is incomplete: {}", self),
            ErrorCategory::Export => format!("Export failed: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 4,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_fields() {
        let err = LedgerError::ValidationError {
            fields: vec!["vendedor".to_string(), "precio".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Required fields are missing or invalid: vendedor, precio"
        );
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert!(err.recovery_suggestion().contains("precio"));
    }

    #[test]
    fn test_exit_codes_follow_severity() {
        let status = LedgerError::ApiStatusError {
            status: 500,
            body: String::new(),
        };
        assert_eq!(status.exit_code(), 2);

        let config = LedgerError::ConfigError {
            message: "bad".to_string(),
        };
        assert_eq!(config.exit_code(), 1);

        let io = LedgerError::IoError(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(io.exit_code(), 3);
    }
}
