use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the weather archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error(
        "Invalid date range. Please select a valid date range within the last 90 days."
    )]
    InvalidDateRange,

    #[error("Weather data not available for the selected location or date range.")]
    NotAvailable,

    #[error("Weather API request failed: {} {reason}", .status.as_u16())]
    RequestFailed { status: StatusCode, reason: String },

    #[error(
        "No weather data available for the selected date range. Try selecting an earlier date range."
    )]
    NoData,

    #[error("Failed to decode weather archive response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error(transparent)]
    Range(#[from] DateRangeError),
}

impl ArchiveError {
    /// Maps a non-success archive status to its error.
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::InvalidDateRange,
            StatusCode::NOT_FOUND => Self::NotAvailable,
            other => Self::RequestFailed {
                status: other,
                reason: other.canonical_reason().unwrap_or("Unknown").to_string(),
            },
        }
    }

    /// Message shown to the user next to the retry action.
    pub fn user_message(&self) -> String {
        match self {
            Self::Decode(_) | Self::Network(_) => "Failed to load weather data".to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::RequestFailed { status, .. } => status.is_server_error(),
            _ => false,
        }
    }
}

/// Why a date range was rejected before any request went out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateRangeError {
    #[error("Invalid date format")]
    InvalidFormat,

    #[error("Start date must be before end date")]
    StartNotBeforeEnd,

    #[error("Cannot select future dates")]
    Future,

    #[error("Data is only available for the last {max_days_back} days")]
    TooOld { max_days_back: u64 },

    #[error("Date range cannot exceed {max_days} days")]
    TooLong { max_days: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("At most {max} parameters can be selected")]
    Full { max: usize },

    #[error("Unknown hourly parameter '{0}'")]
    UnknownParameter(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_matches_user_messages() {
        let err = ArchiveError::from_status(StatusCode::BAD_REQUEST);
        assert!(err.user_message().contains("within the last 90 days"));

        let err = ArchiveError::from_status(StatusCode::NOT_FOUND);
        assert!(err.user_message().contains("not available"));

        let err = ArchiveError::from_status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            err.user_message(),
            "Weather API request failed: 503 Service Unavailable"
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn client_errors_are_not_retryable() {
        assert!(!ArchiveError::InvalidDateRange.is_retryable());
        assert!(!ArchiveError::NoData.is_retryable());
        assert!(!ArchiveError::from_status(StatusCode::FORBIDDEN).is_retryable());
    }

    #[test]
    fn range_errors_read_naturally() {
        assert_eq!(
            DateRangeError::TooLong { max_days: 30 }.to_string(),
            "Date range cannot exceed 30 days"
        );
        assert_eq!(
            DateRangeError::TooOld { max_days_back: 90 }.to_string(),
            "Data is only available for the last 90 days"
        );
    }
}
