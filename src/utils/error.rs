use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("{message}")]
    InvalidInput { message: String },

    #[error("Upload a Markdown file (.md / .markdown / .txt)")]
    UnsupportedFile { name: String },

    #[error("File must be UTF-8 encoded")]
    InvalidEncoding,

    #[error("Render failed: {message}")]
    RenderError { message: String },

    #[error("Render timed out after {timeout:?}")]
    RenderTimeout { timeout: Duration },

    #[error("Server error: {message}")]
    ServerError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Rendering,
    Network,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// CLI 退出碼
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl AppError {
    pub fn render(message: impl Into<String>) -> Self {
        AppError::RenderError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::ConfigError { .. }
            | AppError::InvalidConfigValueError { .. }
            | AppError::MissingConfigError { .. }
            | AppError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            AppError::InvalidInput { .. }
            | AppError::UnsupportedFile { .. }
            | AppError::InvalidEncoding
            | AppError::SerializationError(_) => ErrorCategory::Input,
            AppError::RenderError { .. } | AppError::RenderTimeout { .. } => {
                ErrorCategory::Rendering
            }
            AppError::HttpError(_) => ErrorCategory::Network,
            AppError::IoError(_) | AppError::ServerError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::RenderTimeout { .. } | AppError::HttpError(_) => ErrorSeverity::Medium,
            AppError::IoError(_) | AppError::ServerError { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the config file and MARKDOWN_PDF_* environment variables"
            }
            ErrorCategory::Input => "Provide a UTF-8 Markdown document (.md / .markdown / .txt)",
            ErrorCategory::Rendering => {
                "Retry with a smaller document or raise render_timeout_seconds"
            }
            ErrorCategory::Network => "Make sure the service is running and the URL is reachable",
            ErrorCategory::System => "Check file permissions, free disk space and the bind address",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value for '{}' is invalid: {}", field, reason)
            }
            AppError::MissingConfigError { field } => {
                format!("Configuration value '{}' is required", field)
            }
            AppError::RenderTimeout { timeout } => {
                format!("Rendering took longer than {:?} and was cancelled", timeout)
            }
            AppError::IoError(e) => format!("File system error: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
