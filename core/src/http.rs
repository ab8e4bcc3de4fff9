//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! The core never opens a socket. It compiles settings into a
//! `RequestDescriptor` and hands it to an `HttpClient` supplied by the host,
//! which returns an `HttpResponse` as plain data. Tests plug in a client
//! backed by the mock server; the CLI plugs in ureq.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ApiError;
use crate::request::RequestDescriptor;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            m if m.eq_ignore_ascii_case("GET") => Ok(HttpMethod::Get),
            m if m.eq_ignore_ascii_case("POST") => Ok(HttpMethod::Post),
            other => Err(ApiError::InvalidMethod(other.to_string())),
        }
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// The transport the host provides.
///
/// Implementations execute one blocking round-trip per call and report
/// connection-level failures as `ApiError::Transport`. Any status code the
/// server answers with is returned as an `HttpResponse`.
pub trait HttpClient {
    fn request(&self, descriptor: &RequestDescriptor) -> Result<HttpResponse, ApiError>;
}

impl<C: HttpClient + ?Sized> HttpClient for &C {
    fn request(&self, descriptor: &RequestDescriptor) -> Result<HttpResponse, ApiError> {
        (**self).request(descriptor)
    }
}
