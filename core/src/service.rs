//! The web service facade: stored settings in, response body out.
//!
//! # Design
//! `WebService` snapshots a settings bundle when it is constructed and never
//! reloads it; header and body parameters are parsed once at that point.
//! Each call builds a fresh descriptor and delegates the round-trip to the
//! host's `HttpClient`. Non-2xx answers come back as `ApiError::HttpStatus`
//! so callers see one error channel for every kind of failure.

use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpClient, HttpResponse};
use crate::request::{CompiledSettings, RequestDescriptor, RequestOverrides};
use crate::settings::{Persistence, SettingsBundle, SettingsStore};

/// Outcome of one request.
pub type ResponseResult = Result<HttpResponse, ApiError>;

#[derive(Debug, Clone)]
pub struct WebService {
    settings: SettingsBundle,
    compiled: CompiledSettings,
}

impl WebService {
    pub fn new(settings: SettingsBundle) -> Self {
        let compiled = CompiledSettings::from_bundle(&settings);
        Self { settings, compiled }
    }

    /// Load the bundle stored under `bundle_id` and build a service from it.
    pub fn from_store<P: Persistence>(
        store: &mut SettingsStore<P>,
        bundle_id: &str,
    ) -> Result<Self, ApiError> {
        Ok(Self::new(store.load(bundle_id)?))
    }

    pub fn settings(&self) -> &SettingsBundle {
        &self.settings
    }

    pub fn build_request(
        &self,
        url: Option<&str>,
        overrides: Option<&RequestOverrides>,
    ) -> Result<RequestDescriptor, ApiError> {
        self.compiled.build(url, overrides)
    }

    /// Perform the request described by the stored settings, optionally
    /// redirected to `url` and adjusted by `overrides`.
    pub fn get_response<C: HttpClient>(
        &self,
        client: &C,
        url: Option<&str>,
        overrides: Option<&RequestOverrides>,
    ) -> ResponseResult {
        let descriptor = self.build_request(url, overrides)?;
        debug!(
            method = %descriptor.method,
            url = %descriptor.url,
            verify_ssl = descriptor.verify_ssl,
            "sending request"
        );
        let response = client.request(&descriptor).inspect_err(|e| {
            warn!(url = %descriptor.url, error = %e, "request failed");
        })?;
        check_status(response)
    }

    /// The textual body of a successful response, or `""` for any error.
    pub fn response_body(response: &ResponseResult) -> &str {
        match response {
            Ok(r) => &r.body,
            Err(_) => "",
        }
    }
}

fn check_status(response: HttpResponse) -> ResponseResult {
    if response.is_success() {
        return Ok(response);
    }
    warn!(status = response.status, "non-success status");
    Err(ApiError::HttpStatus {
        status: response.status,
        body: response.body,
    })
}
