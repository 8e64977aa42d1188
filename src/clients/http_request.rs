//! HTTP request types for the synchronization engine.
//!
//! This module provides the [`HttpRequest`] type and its builder for
//! constructing requests against the remote accounting API.

use std::collections::HashMap;
use std::fmt;

use crate::clients::errors::InvalidHttpRequestError;

/// HTTP methods supported by the remote API.
///
/// The accounting API overloads verbs per resource type (some resources
/// create with PUT, others with POST), so the full set is carried on every
/// resource descriptor rather than fixed per operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method for retrieving resources.
    Get,
    /// HTTP POST method, typically update semantics on this API.
    Post,
    /// HTTP PUT method, typically create semantics on this API.
    Put,
    /// HTTP DELETE method for removing resources.
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// Content type for HTTP request bodies.
///
/// The engine sends structured-markup bodies for wrapped resource types and
/// plain JSON for unwrapped ones; responses are always requested as JSON.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    /// JSON content type (`application/json`).
    Json,
    /// XML content type (`application/xml`).
    Xml,
}

impl DataType {
    /// Returns the MIME type string for this data type.
    #[must_use]
    pub const fn as_content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }
}

/// An HTTP request to be sent to the remote API.
///
/// Use [`HttpRequest::builder`] to construct requests with the builder
/// pattern.
///
/// # Example
///
/// ```rust
/// use ledger_sync::clients::{HttpRequest, HttpMethod, DataType};
///
/// let request = HttpRequest::builder(HttpMethod::Put, "api.xro/2.0/Contacts")
///     .body(r#"{"Name":"Acme"}"#)
///     .body_type(DataType::Json)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The HTTP method for this request.
    pub http_method: HttpMethod,
    /// The path (relative to the base URI) for this request.
    pub path: String,
    /// The raw request body, if any.
    pub body: Option<String>,
    /// The content type of the body.
    pub body_type: Option<DataType>,
    /// Query parameters to append to the URL.
    pub query: Option<HashMap<String, String>>,
}

impl HttpRequest {
    /// Creates a new builder for constructing an `HttpRequest`.
    #[must_use]
    pub fn builder(method: HttpMethod, path: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(method, path)
    }

    /// Validates the request, ensuring it meets all requirements.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if:
    /// - `body` is `Some` but `body_type` is `None`
    /// - `http_method` is `Post` or `Put` but `body` is `None`
    pub fn verify(&self) -> Result<(), InvalidHttpRequestError> {
        if self.body.is_some() && self.body_type.is_none() {
            return Err(InvalidHttpRequestError::MissingBodyType);
        }

        if matches!(self.http_method, HttpMethod::Post | HttpMethod::Put) && self.body.is_none() {
            return Err(InvalidHttpRequestError::MissingBody {
                method: self.http_method.to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for constructing [`HttpRequest`] instances.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    http_method: HttpMethod,
    path: String,
    body: Option<String>,
    body_type: Option<DataType>,
    query: Option<HashMap<String, String>>,
}

impl HttpRequestBuilder {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            http_method: method,
            path: path.into(),
            body: None,
            body_type: None,
            query: None,
        }
    }

    /// Sets the raw request body.
    ///
    /// When setting a body, you must also set the body type via
    /// [`body_type`](Self::body_type).
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the content type of the request body.
    #[must_use]
    pub const fn body_type(mut self, body_type: DataType) -> Self {
        self.body_type = Some(body_type);
        self
    }

    /// Sets all query parameters at once.
    #[must_use]
    pub fn query(mut self, query: HashMap<String, String>) -> Self {
        self.query = Some(query);
        self
    }

    /// Adds a single query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Builds the [`HttpRequest`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the request fails validation.
    pub fn build(self) -> Result<HttpRequest, InvalidHttpRequestError> {
        let request = HttpRequest {
            http_method: self.http_method,
            path: self.path,
            body: self.body,
            body_type: self.body_type,
            query: self.query,
        };
        request.verify()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_displays_uppercase() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.to_string(), "POST");
        assert_eq!(HttpMethod::Put.to_string(), "PUT");
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_data_type_content_types() {
        assert_eq!(DataType::Json.as_content_type(), "application/json");
        assert_eq!(DataType::Xml.as_content_type(), "application/xml");
    }

    #[test]
    fn test_builder_constructs_get_request() {
        let request = HttpRequest::builder(HttpMethod::Get, "api.xro/2.0/Contacts")
            .query_param("IDs", "a,b")
            .build()
            .unwrap();

        assert_eq!(request.http_method, HttpMethod::Get);
        assert_eq!(request.path, "api.xro/2.0/Contacts");
        assert_eq!(request.query.unwrap().get("IDs"), Some(&"a,b".to_string()));
    }

    #[test]
    fn test_post_without_body_fails_validation() {
        let result = HttpRequest::builder(HttpMethod::Post, "api.xro/2.0/Contacts").build();
        assert!(matches!(
            result,
            Err(InvalidHttpRequestError::MissingBody { .. })
        ));
    }

    #[test]
    fn test_body_without_body_type_fails_validation() {
        let result = HttpRequest::builder(HttpMethod::Put, "api.xro/2.0/Contacts")
            .body("<Contact/>")
            .build();
        assert!(matches!(
            result,
            Err(InvalidHttpRequestError::MissingBodyType)
        ));
    }

    #[test]
    fn test_delete_without_body_is_valid() {
        let request = HttpRequest::builder(HttpMethod::Delete, "api.xro/2.0/Contacts/abc")
            .build()
            .unwrap();
        assert!(request.body.is_none());
    }
}
