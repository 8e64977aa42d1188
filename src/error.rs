//! Configuration error types.

use thiserror::Error;

/// Errors that can occur when building or validating configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required builder field was not provided.
    #[error("Missing required configuration field: {field}")]
    MissingField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// The base URL is not an absolute http(s) URL.
    #[error("Invalid API base URL: {url}")]
    InvalidBaseUrl {
        /// The rejected value.
        url: String,
    },

    /// The access token was empty.
    #[error("Access token must not be empty")]
    EmptyAccessToken,
}

// Verify ConfigError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ConfigError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message_names_field() {
        let error = ConfigError::MissingField { field: "base_url" };
        assert!(error.to_string().contains("base_url"));
    }

    #[test]
    fn test_invalid_base_url_message_includes_value() {
        let error = ConfigError::InvalidBaseUrl {
            url: "ftp://example.com".to_string(),
        };
        assert!(error.to_string().contains("ftp://example.com"));
    }
}
