use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("SMTP transport error: {0}")]
    SmtpError(#[from] lettre::transport::smtp::Error),

    #[error("Email message error: {0}")]
    MessageError(#[from] lettre::error::Error),

    #[error("Invalid email address: {0}")]
    AddressError(#[from] lettre::address::AddressError),

    #[error("Rendering email body failed: {0}")]
    TemplateError(#[from] askama::Error),

    #[error("Invalid CSS selector '{selector}': {message}")]
    SelectorError { selector: String, message: String },

    #[error("Fetching titles failed: {reason}")]
    FetchFailed { reason: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

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
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Mail,
    Parsing,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl WatchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            WatchError::HttpError(_) | WatchError::FetchFailed { .. } => ErrorCategory::Network,
            WatchError::IoError(_) => ErrorCategory::Storage,
            WatchError::SmtpError(_)
            | WatchError::MessageError(_)
            | WatchError::AddressError(_)
            | WatchError::TemplateError(_) => ErrorCategory::Mail,
            WatchError::SelectorError { .. } => ErrorCategory::Parsing,
            WatchError::ConfigError { .. }
            | WatchError::ConfigValidationError { .. }
            | WatchError::InvalidConfigValueError { .. }
            | WatchError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Mail | ErrorCategory::Parsing | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            WatchError::HttpError(_) | WatchError::FetchFailed { .. } => {
                "Check that the source page is reachable and try again later".to_string()
            }
            WatchError::IoError(_) => {
                "Check that the snapshot path exists and is writable".to_string()
            }
            WatchError::SmtpError(_) => {
                "Check the SMTP host, port, security mode and credentials (Gmail needs an app password)"
                    .to_string()
            }
            WatchError::MessageError(_) | WatchError::AddressError(_) => {
                "Check the smtp.from and smtp.to addresses".to_string()
            }
            WatchError::TemplateError(_) => {
                "Check that the email templates were built into the binary".to_string()
            }
            WatchError::SelectorError { .. } => {
                "Use a valid CSS selector such as 'div.thesistitle'".to_string()
            }
            WatchError::ConfigError { .. } => {
                "Make sure the config file exists and is valid TOML".to_string()
            }
            WatchError::ConfigValidationError { field, .. }
            | WatchError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' in the config file", field)
            }
            WatchError::MissingConfigError { field } => {
                format!("Set '{}' in the config file or the environment", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not read the thesis page: {}", self),
            ErrorCategory::Storage => format!("Could not access the snapshot file: {}", self),
            ErrorCategory::Mail => format!("Could not prepare the email: {}", self),
            ErrorCategory::Parsing => format!("Could not process the page: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, WatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failure_is_retryable() {
        let err = WatchError::FetchFailed {
            reason: "HTTP status 503".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_config_errors_point_at_field() {
        let err = WatchError::MissingConfigError {
            field: "smtp.password".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.exit_code(), 1);
        assert!(err.recovery_suggestion().contains("smtp.password"));
    }

    #[test]
    fn test_io_error_is_critical() {
        let err = WatchError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 3);
        assert!(err.user_friendly_message().contains("snapshot"));
    }
}
