use std::fmt;

/// Application-specific error types.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Sailthru answered but reported a failure (`is_ok()` was false).
    Api {
        /// Vendor-defined error code, e.g. `9` for an invalid API key.
        code: i64,
        /// Human-readable message from the vendor.
        message: String,
    },
    /// The request never produced a usable HTTP response.
    ExternalApiError {
        message: String,
        /// Whether the transport gave up because of a timeout.
        timeout: bool,
    },
    /// The response body was not valid JSON.
    InvalidResponse(String),
    /// The client could not be constructed.
    Config(String),
}

impl AppError {
    /// Builds the uniform API error raised for any non-ok vendor response.
    pub fn api(code: i64, message: impl Into<String>) -> Self {
        AppError::Api {
            code,
            message: message.into(),
        }
    }

    /// True when the underlying HTTP request timed out.
    ///
    /// Callers scheduling these queries use this to decide whether a failed
    /// run is worth trying again later.
    pub fn is_timeout(&self) -> bool {
        matches!(self, AppError::ExternalApiError { timeout: true, .. })
    }

    /// Vendor error code, if this is an API-level failure.
    pub fn api_error_code(&self) -> Option<i64> {
        match self {
            AppError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Vendor error message, if this is an API-level failure.
    pub fn api_error_message(&self) -> Option<&str> {
        match self {
            AppError::Api { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    ///
    /// API errors render as `"<message> (<code>)"` with no prefix so that the
    /// vendor's wording reaches the caller unchanged.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Api { code, message } => write!(f, "{} ({})", message, code),
            AppError::ExternalApiError { message, .. } => {
                write!(f, "External API error: {}", message)
            }
            AppError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    /// Converts a `reqwest::Error` into an `AppError`.
    fn from(err: reqwest::Error) -> Self {
        AppError::ExternalApiError {
            timeout: err.is_timeout(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = AppError::api(9, "Invalid API key");
        assert_eq!(err.to_string(), "Invalid API key (9)");
        assert_eq!(err.api_error_code(), Some(9));
        assert_eq!(err.api_error_message(), Some("Invalid API key"));
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_timeout_detection() {
        let err = AppError::ExternalApiError {
            message: "operation timed out".to_string(),
            timeout: true,
        };
        assert!(err.is_timeout());
        assert_eq!(err.api_error_code(), None);

        let err = AppError::ExternalApiError {
            message: "connection refused".to_string(),
            timeout: false,
        };
        assert!(!err.is_timeout());
    }
}
