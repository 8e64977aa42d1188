//! HTTP-specific error types for the synchronization engine.
//!
//! This module contains error types for transport operations. The engine
//! itself never retries; any transport failure here is terminal for the
//! call that triggered it.

use thiserror::Error;

/// Error returned when an HTTP request receives a non-successful response.
///
/// The message field carries the raw response body so callers can inspect
/// provider-specific error detail (validation messages, error numbers).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// The response body, verbatim.
    pub message: String,
}

/// Error returned when an HTTP request fails validation before sending.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A request body was provided without specifying the body type.
    #[error("Cannot set a body without also setting body_type.")]
    MissingBodyType,

    /// A POST or PUT request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },
}

/// Unified error type for all HTTP-related errors.
///
/// Use pattern matching to handle specific failure scenarios:
///
/// ```rust,ignore
/// match client.request(request).await {
///     Ok(response) => { /* handle success */ }
///     Err(HttpError::Response(e)) => println!("API error {}: {}", e.code, e.message),
///     Err(HttpError::InvalidRequest(e)) => println!("Invalid request: {e}"),
///     Err(HttpError::Network(e)) => println!("Network error: {e}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum HttpError {
    /// An HTTP response error (non-2xx status code).
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl HttpError {
    /// Returns the HTTP status code if this error carries one.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Response(e) => Some(e.code),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            Self::InvalidRequest(_) => None,
        }
    }
}

// Verify error types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_response_error_message_is_body() {
        let error = HttpResponseError {
            code: 404,
            message: r#"{"Message":"The resource you're looking for cannot be found"}"#.to_string(),
        };
        assert!(error.to_string().contains("cannot be found"));
    }

    #[test]
    fn test_invalid_request_error_missing_body() {
        let error = InvalidHttpRequestError::MissingBody {
            method: "POST".to_string(),
        };
        assert_eq!(error.to_string(), "Cannot use POST without specifying data.");
    }

    #[test]
    fn test_status_code_extraction() {
        let error = HttpError::Response(HttpResponseError {
            code: 401,
            message: "unauthorized".to_string(),
        });
        assert_eq!(error.status_code(), Some(401));

        let error = HttpError::InvalidRequest(InvalidHttpRequestError::MissingBodyType);
        assert_eq!(error.status_code(), None);
    }

    #[test]
    fn test_error_types_implement_std_error() {
        let response_error: &dyn std::error::Error = &HttpResponseError {
            code: 400,
            message: "test".to_string(),
        };
        let _ = response_error;

        let invalid_error: &dyn std::error::Error = &InvalidHttpRequestError::MissingBodyType;
        let _ = invalid_error;
    }
}
