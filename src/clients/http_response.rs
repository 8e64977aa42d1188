//! HTTP response types for the synchronization engine.

use std::collections::HashMap;

/// An HTTP response from the remote API.
///
/// Contains the response status code, headers, and the body parsed as JSON.
/// The engine always requests JSON responses (even when it sends XML
/// bodies), so a single parsed representation is enough.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body.
    pub body: serde_json::Value,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`.
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, body: serde_json::Value) -> Self {
        Self {
            code,
            headers,
            body,
        }
    }

    /// Returns `true` if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code < 300
    }

    /// Returns the first value of the given header, if present.
    ///
    /// Header names are matched case-insensitively against the lowercase
    /// keys stored at construction time.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_ok_for_2xx_codes() {
        let response = HttpResponse::new(200, HashMap::new(), json!({}));
        assert!(response.is_ok());

        let response = HttpResponse::new(204, HashMap::new(), json!({}));
        assert!(response.is_ok());
    }

    #[test]
    fn test_is_ok_false_for_error_codes() {
        let response = HttpResponse::new(404, HashMap::new(), json!({}));
        assert!(!response.is_ok());

        let response = HttpResponse::new(500, HashMap::new(), json!({}));
        assert!(!response.is_ok());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), vec!["application/json".to_string()]);

        let response = HttpResponse::new(200, headers, json!({}));
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.header("x-missing"), None);
    }
}
