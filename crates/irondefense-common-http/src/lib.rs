//! HTTP client utilities for the IronDefense connector.
//!
//! [`HttpClient`] issues a single JSON POST with Basic auth and hands back
//! the raw [`HttpResponse`]; [`classify_response`] decides whether that
//! response is a usable JSON payload or an error worth showing an analyst.

pub mod client;
pub mod request;
pub mod response;

pub use client::{build_client, HttpClient, HttpConfig, HttpError, HttpResponse};
pub use request::{headers, join_url, BasicAuth};
pub use response::{classify_response, html_to_text, ResponseError};
