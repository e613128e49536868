//! Generator errors and their retry classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors that can occur while talking to a text generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BackendError {
    /// API request failed with the given message
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// Authentication failed or credentials are invalid
    AuthenticationError { message: String },

    /// Request timed out after the specified duration (in seconds)
    TimeoutError { seconds: u64 },

    /// Rate limit or quota exceeded
    RateLimitError { retry_after: Option<u64> },

    /// The requested model does not exist or is not served
    ModelUnavailable { model: String },

    /// Invalid or malformed response from the generator
    InvalidResponse {
        message: String,
        raw_response: Option<String>,
    },

    /// Configuration error (missing API keys, invalid settings, etc.)
    ConfigurationError { message: String },

    /// Network-related error
    NetworkError { message: String },

    /// Generic error for other cases
    Other { message: String },
}

/// How the orchestrator reacts to a failed generator call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Back off and retry
    RateLimit,
    /// Switch model (first attempt only)
    InvalidModel,
    Timeout,
    /// Consume an attempt without sleeping
    Other,
}

const RATE_LIMIT_MARKERS: &[&str] = &["quota", "rate limit", "429", "exceeded"];
const INVALID_MODEL_MARKERS: &[&str] = &["not found", "invalid model"];

impl BackendError {
    fn message_text(&self) -> Option<&str> {
        match self {
            BackendError::ApiError { message, .. }
            | BackendError::AuthenticationError { message }
            | BackendError::InvalidResponse { message, .. }
            | BackendError::ConfigurationError { message }
            | BackendError::NetworkError { message }
            | BackendError::Other { message } => Some(message),
            _ => None,
        }
    }

    /// Classifies the error by variant, then by message keywords
    ///
    /// Providers surface quota and unknown-model failures as generic API
    /// errors, so the message text decides for the untyped variants.
    pub fn class(&self) -> ErrorClass {
        match self {
            BackendError::RateLimitError { .. } => return ErrorClass::RateLimit,
            BackendError::ModelUnavailable { .. } => return ErrorClass::InvalidModel,
            BackendError::TimeoutError { .. } => return ErrorClass::Timeout,
            BackendError::ApiError {
                status_code: Some(429),
                ..
            } => return ErrorClass::RateLimit,
            BackendError::ApiError {
                status_code: Some(404),
                ..
            } => return ErrorClass::InvalidModel,
            _ => {}
        }

        let Some(message) = self.message_text() else {
            return ErrorClass::Other;
        };
        let lower = message.to_lowercase();
        if RATE_LIMIT_MARKERS.iter().any(|m| lower.contains(m)) {
            ErrorClass::RateLimit
        } else if INVALID_MODEL_MARKERS.iter().any(|m| lower.contains(m)) {
            ErrorClass::InvalidModel
        } else {
            ErrorClass::Other
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::ApiError {
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "API error ({}): {}", code, message)
                } else {
                    write!(f, "API error: {}", message)
                }
            }
            BackendError::AuthenticationError { message } => {
                write!(f, "Authentication failed: {}", message)
            }
            BackendError::TimeoutError { seconds } => {
                write!(f, "Request timed out after {} seconds", seconds)
            }
            BackendError::RateLimitError { retry_after } => {
                if let Some(seconds) = retry_after {
                    write!(f, "Rate limit exceeded, retry after {} seconds", seconds)
                } else {
                    write!(f, "Rate limit exceeded")
                }
            }
            BackendError::ModelUnavailable { model } => {
                write!(f, "Model not found: {}", model)
            }
            BackendError::InvalidResponse { message, .. } => {
                write!(f, "Invalid response from generator: {}", message)
            }
            BackendError::ConfigurationError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            BackendError::NetworkError { message } => {
                write!(f, "Network error: {}", message)
            }
            BackendError::Other { message } => {
                write!(f, "Error: {}", message)
            }
        }
    }
}

impl std::error::Error for BackendError {}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    fn api(message: &str) -> BackendError {
        BackendError::ApiError {
            message: message.to_string(),
            status_code: None,
        }
    }

    #[parameterized(
        quota = { api("Resource has been exhausted (e.g. check quota)."), ErrorClass::RateLimit },
        status_text = { api("HTTP 429 Too Many Requests"), ErrorClass::RateLimit },
        exceeded = { api("Requests per minute exceeded"), ErrorClass::RateLimit },
        unknown_model = { api("models/gemini-9 is not found for API version v1beta"), ErrorClass::InvalidModel },
        invalid_model = { api("Invalid model name"), ErrorClass::InvalidModel },
        transport = { api("connection reset by peer"), ErrorClass::Other },
        timeout = { BackendError::TimeoutError { seconds: 30 }, ErrorClass::Timeout },
        typed_rate = { BackendError::RateLimitError { retry_after: Some(5) }, ErrorClass::RateLimit },
        typed_model = { BackendError::ModelUnavailable { model: "x".into() }, ErrorClass::InvalidModel },
    )]
    fn test_classification(error: BackendError, expected: ErrorClass) {
        assert_eq!(error.class(), expected);
    }

    #[test]
    fn test_status_code_classification() {
        let err = BackendError::ApiError {
            message: "boom".into(),
            status_code: Some(429),
        };
        assert_eq!(err.class(), ErrorClass::RateLimit);
    }

    #[test]
    fn test_display() {
        let err = BackendError::RateLimitError { retry_after: None };
        assert_eq!(err.to_string(), "Rate limit exceeded");
        let err = BackendError::ApiError {
            message: "bad".into(),
            status_code: Some(500),
        };
        assert_eq!(err.to_string(), "API error (500): bad");
    }
}
