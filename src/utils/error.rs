use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Request to registry failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Registry returned HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("No coordinates found: {reason}")]
    NoCoordinates { reason: String },

    #[error("Document parse error: {message}")]
    Parse { message: String },

    #[error("Calibration error: {message}")]
    Calibration { message: String },

    #[error("Projection error: {message}")]
    Projection { message: String },

    #[error("Cannot project an empty coordinate set")]
    EmptyInput,

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

pub type Result<T> = std::result::Result<T, PlotError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Parse,
    Calibration,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// The three user-facing reasons a title deed lookup can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    ServerUnreachable,
    NoCoordinates,
    InvalidTitleDeed,
}

impl FailureReason {
    pub fn message(&self) -> &'static str {
        match self {
            FailureReason::ServerUnreachable => {
                "There is a problem reaching the land registry server. Please try again later."
            }
            FailureReason::NoCoordinates => "No valid coordinates were found for this title deed.",
            FailureReason::InvalidTitleDeed => {
                "Invalid title deed number. Please enter the correct number."
            }
        }
    }
}

impl PlotError {
    pub fn no_coordinates(reason: impl Into<String>) -> Self {
        PlotError::NoCoordinates {
            reason: reason.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        PlotError::Parse {
            message: message.into(),
        }
    }

    pub fn calibration(message: impl Into<String>) -> Self {
        PlotError::Calibration {
            message: message.into(),
        }
    }

    pub fn projection(message: impl Into<String>) -> Self {
        PlotError::Projection {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PlotError::Transport(_) | PlotError::HttpStatus { .. } => ErrorCategory::Network,
            PlotError::NoCoordinates { .. } | PlotError::EmptyInput => ErrorCategory::Data,
            PlotError::Parse { .. } => ErrorCategory::Parse,
            PlotError::Calibration { .. } | PlotError::Projection { .. } => {
                ErrorCategory::Calibration
            }
            PlotError::Url(_)
            | PlotError::ConfigValidationError { .. }
            | PlotError::InvalidConfigValueError { .. }
            | PlotError::MissingConfigError { .. } => ErrorCategory::Configuration,
            PlotError::Csv(_) | PlotError::Io(_) | PlotError::Serialization(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Data => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Parse | ErrorCategory::Calibration => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Maps the error onto one of the user-facing lookup failures.
    /// Returns `None` for configuration and system errors, which are not lookup outcomes.
    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            PlotError::Transport(_) | PlotError::HttpStatus { .. } => {
                Some(FailureReason::ServerUnreachable)
            }
            PlotError::NoCoordinates { .. } | PlotError::EmptyInput => {
                Some(FailureReason::NoCoordinates)
            }
            PlotError::Parse { .. } => Some(FailureReason::InvalidTitleDeed),
            _ => None,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.failure_reason() {
            Some(reason) => reason.message().to_string(),
            None => match self {
                PlotError::Calibration { message } => {
                    format!("Calibration model could not be evaluated: {}", message)
                }
                PlotError::Projection { message } => {
                    format!("Coordinates could not be projected: {}", message)
                }
                other => other.to_string(),
            },
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check network connectivity and the registry base URL, then retry",
            ErrorCategory::Data => "Verify the title deed number on the registry website",
            ErrorCategory::Parse => "Check the title deed number; the registry page layout may have changed",
            ErrorCategory::Calibration => {
                "Check that the calibration reference points are distinct, non-colinear and 2-dimensional"
            }
            ErrorCategory::Configuration => "Review the configuration file and command-line flags",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reason_three_way_mapping() {
        let status = PlotError::HttpStatus {
            url: "http://x/certificate/1".to_string(),
            status: 500,
        };
        assert_eq!(status.failure_reason(), Some(FailureReason::ServerUnreachable));
        assert_eq!(
            PlotError::no_coordinates("empty table").failure_reason(),
            Some(FailureReason::NoCoordinates)
        );
        assert_eq!(
            PlotError::EmptyInput.failure_reason(),
            Some(FailureReason::NoCoordinates)
        );
        assert_eq!(
            PlotError::parse("unterminated <table>").failure_reason(),
            Some(FailureReason::InvalidTitleDeed)
        );
        assert_eq!(PlotError::calibration("singular").failure_reason(), None);
    }

    #[test]
    fn test_user_friendly_message_hides_parse_details() {
        let err = PlotError::parse("stray </table> at byte 120");
        assert!(err.to_string().contains("stray"));
        assert_eq!(
            err.user_friendly_message(),
            FailureReason::InvalidTitleDeed.message()
        );
    }

    #[test]
    fn test_severity_ordering() {
        assert!(PlotError::EmptyInput.severity() < PlotError::parse("x").severity());
        assert_eq!(
            PlotError::MissingConfigError {
                field: "source.base_url".to_string()
            }
            .severity(),
            ErrorSeverity::Critical
        );
    }
}
