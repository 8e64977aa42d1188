//! Validated newtypes for configuration values.
//!
//! All newtypes validate on construction, so an instance is always valid
//! for the lifetime of the process.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The base URL of the remote API (e.g., `https://api.xero.com`).
///
/// Must be an absolute `http`/`https` URL. A trailing slash is stripped so
/// path joining stays predictable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiBaseUrl(String);

impl ApiBaseUrl {
    /// Creates a new `ApiBaseUrl`, validating the scheme.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the value is empty or
    /// does not start with `http://` or `https://`.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let trimmed = url.trim_end_matches('/');

        if trimmed.is_empty()
            || !(trimmed.starts_with("https://") || trimmed.starts_with("http://"))
        {
            return Err(ConfigError::InvalidBaseUrl { url });
        }

        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for ApiBaseUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiBaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A bearer access token for the remote API.
///
/// Token acquisition (OAuth flows, refresh) is out of scope for this crate;
/// callers obtain a token elsewhere and hand it to the configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken(String);

impl AccessToken {
    /// Creates a new `AccessToken`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyAccessToken`] if the value is empty.
    pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ConfigError::EmptyAccessToken);
        }
        Ok(Self(token))
    }
}

impl AsRef<str> for AccessToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Tokens are secrets; keep them out of debug output.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_base_url_accepts_https() {
        let url = ApiBaseUrl::new("https://api.xero.com").unwrap();
        assert_eq!(url.as_ref(), "https://api.xero.com");
    }

    #[test]
    fn test_api_base_url_strips_trailing_slash() {
        let url = ApiBaseUrl::new("https://api.xero.com/").unwrap();
        assert_eq!(url.as_ref(), "https://api.xero.com");
    }

    #[test]
    fn test_api_base_url_rejects_missing_scheme() {
        assert!(matches!(
            ApiBaseUrl::new("api.xero.com"),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn test_api_base_url_rejects_empty() {
        assert!(ApiBaseUrl::new("").is_err());
        assert!(ApiBaseUrl::new("/").is_err());
    }

    #[test]
    fn test_access_token_rejects_empty() {
        assert!(matches!(
            AccessToken::new("   "),
            Err(ConfigError::EmptyAccessToken)
        ));
    }

    #[test]
    fn test_access_token_debug_redacts_value() {
        let token = AccessToken::new("super-secret").unwrap();
        let debug = format!("{token:?}");
        assert!(!debug.contains("super-secret"));
    }
}
