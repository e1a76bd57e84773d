use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("{context}: HTTP {status} from {url}")]
    HttpStatusError {
        context: String,
        url: String,
        status: u16,
    },

    #[error("{context}: giving up after {attempts} attempts (last status {status})")]
    RetryExhaustedError {
        context: String,
        attempts: u32,
        status: u16,
    },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to fetch complete data: {message}")]
    AggregationFailed { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Upstream,
    Data,
    Configuration,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::HttpStatusError { .. }
            | EtlError::RetryExhaustedError { .. }
            | EtlError::AggregationFailed { .. } => ErrorCategory::Upstream,
            EtlError::SerializationError(_)
            | EtlError::CsvError(_)
            | EtlError::ProcessingError { .. }
            | EtlError::ValidationError { .. } => ErrorCategory::Data,
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::IoError(_) => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 重試耗盡或暫時性網路錯誤，稍後重跑通常可恢復
            EtlError::ApiError(_) | EtlError::RetryExhaustedError { .. } => ErrorSeverity::Medium,
            EtlError::HttpStatusError { .. }
            | EtlError::AggregationFailed { .. }
            | EtlError::SerializationError(_)
            | EtlError::CsvError(_)
            | EtlError::ProcessingError { .. }
            | EtlError::ValidationError { .. } => ErrorSeverity::High,
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// Whether the request executor may try the same call again.
    pub fn is_transient(&self) -> bool {
        match self {
            EtlError::ApiError(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check your network connection and try again",
            ErrorCategory::Upstream => {
                "The results API is rate limited or unavailable; wait a moment and retry"
            }
            ErrorCategory::Data => "The API returned data in an unexpected shape; check the base URL",
            ErrorCategory::Configuration => "Fix the configuration file or command line flags",
            ErrorCategory::Storage => "Check that the output path exists and is writable",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::ApiError(_) => "Could not reach the results API".to_string(),
            EtlError::RetryExhaustedError { context, .. } => {
                format!("{} kept failing after several retries", context)
            }
            EtlError::HttpStatusError { context, status, .. } => {
                format!("{} was rejected by the API (HTTP {})", context, status)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregation_error_carries_fixed_prefix() {
        let err = EtlError::AggregationFailed {
            message: "Invalid year range".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to fetch complete data: Invalid year range");
        assert_eq!(err.category(), ErrorCategory::Upstream);
    }

    #[test]
    fn test_severity_ordering() {
        let retry = EtlError::RetryExhaustedError {
            context: "F1 seasons (race results)".to_string(),
            attempts: 4,
            status: 429,
        };
        let config = EtlError::MissingConfigError {
            field: "source.base_url".to_string(),
        };
        assert!(retry.severity() < config.severity());
        assert!(retry.user_friendly_message().contains("F1 seasons (race results)"));
    }
}
