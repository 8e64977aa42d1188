//! Transport layer for the synchronization engine.
//!
//! This module contains the HTTP plumbing the engine drives:
//!
//! - [`HttpClient`]: reqwest-based client with default headers and JSON
//!   response parsing
//! - [`HttpRequest`] and [`HttpRequestBuilder`]: validated request
//!   construction
//! - [`HttpResponse`]: parsed response (status, headers, JSON body)
//! - Error types: [`HttpError`], [`HttpResponseError`],
//!   [`InvalidHttpRequestError`]
//!
//! The transport contains no synchronization decision logic: verb choice,
//! body shape, and response folding all live in [`crate::sync`]. There is
//! no retry loop here either; any retry policy belongs to the caller.

mod errors;
mod http_client;
mod http_request;
mod http_response;

pub use errors::{HttpError, HttpResponseError, InvalidHttpRequestError};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{DataType, HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;
