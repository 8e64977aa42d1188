//! Configuration for the synchronization engine.
//!
//! Configuration is instance-based and passed explicitly; there is no
//! global state. Use [`SyncConfig::builder`] to construct a validated
//! configuration:
//!
//! ```rust
//! use ledger_sync::{SyncConfig, ApiBaseUrl, AccessToken};
//!
//! let config = SyncConfig::builder()
//!     .base_url(ApiBaseUrl::new("https://api.xero.com").unwrap())
//!     .access_token(AccessToken::new("token").unwrap())
//!     .build()
//!     .unwrap();
//! ```

mod newtypes;

pub use newtypes::{AccessToken, ApiBaseUrl};

use crate::error::ConfigError;

/// Configuration for connecting to a remote accounting API.
///
/// Immutable after construction; shared by reference with the transport.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    base_url: ApiBaseUrl,
    access_token: AccessToken,
    user_agent_prefix: Option<String>,
}

impl SyncConfig {
    /// Creates a new builder for constructing a `SyncConfig`.
    #[must_use]
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    /// Returns the API base URL.
    #[must_use]
    pub const fn base_url(&self) -> &ApiBaseUrl {
        &self.base_url
    }

    /// Returns the bearer access token.
    #[must_use]
    pub const fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    /// Returns the User-Agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

/// Builder for [`SyncConfig`].
#[derive(Debug, Default)]
pub struct SyncConfigBuilder {
    base_url: Option<ApiBaseUrl>,
    access_token: Option<AccessToken>,
    user_agent_prefix: Option<String>,
}

impl SyncConfigBuilder {
    /// Sets the API base URL (required).
    #[must_use]
    pub fn base_url(mut self, base_url: ApiBaseUrl) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Sets the bearer access token (required).
    #[must_use]
    pub fn access_token(mut self, access_token: AccessToken) -> Self {
        self.access_token = Some(access_token);
        self
    }

    /// Sets an optional prefix for the User-Agent header.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] if a required field was not
    /// provided.
    pub fn build(self) -> Result<SyncConfig, ConfigError> {
        let base_url = self
            .base_url
            .ok_or(ConfigError::MissingField { field: "base_url" })?;
        let access_token = self.access_token.ok_or(ConfigError::MissingField {
            field: "access_token",
        })?;

        Ok(SyncConfig {
            base_url,
            access_token,
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_base_url() {
        let result = SyncConfig::builder()
            .access_token(AccessToken::new("token").unwrap())
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingField { field: "base_url" })
        ));
    }

    #[test]
    fn test_builder_requires_access_token() {
        let result = SyncConfig::builder()
            .base_url(ApiBaseUrl::new("https://api.xero.com").unwrap())
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingField {
                field: "access_token"
            })
        ));
    }

    #[test]
    fn test_builder_constructs_full_config() {
        let config = SyncConfig::builder()
            .base_url(ApiBaseUrl::new("https://api.xero.com").unwrap())
            .access_token(AccessToken::new("token").unwrap())
            .user_agent_prefix("MyApp")
            .build()
            .unwrap();

        assert_eq!(config.base_url().as_ref(), "https://api.xero.com");
        assert_eq!(config.access_token().as_ref(), "token");
        assert_eq!(config.user_agent_prefix(), Some("MyApp"));
    }
}
