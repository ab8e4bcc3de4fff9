//! ureq-backed `HttpClient`.
//!
//! A fresh agent is configured per request because TLS verification and the
//! timeout are per-descriptor settings. Form parameters travel in the query
//! string for GET and as a urlencoded body for POST; a raw body is sent as
//! is on POST and dropped on GET.

use tracing::debug;
use ureq::tls::TlsConfig;
use url::Url;
use webservice_core::{ApiError, HttpClient, HttpMethod, HttpResponse, RequestBody, RequestDescriptor};

#[derive(Debug, Clone, Copy, Default)]
pub struct UreqClient;

impl UreqClient {
    pub fn new() -> Self {
        Self
    }
}

/// The URL actually requested: GET form parameters are appended to the query.
pub fn target_url(req: &RequestDescriptor) -> Result<Url, ApiError> {
    let mut url = Url::parse(&req.url).map_err(|e| ApiError::Transport(format!("{}: {e}", req.url)))?;
    if let (HttpMethod::Get, RequestBody::Form(params)) = (req.method, &req.body) {
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.iter());
        }
    }
    Ok(url)
}

impl HttpClient for UreqClient {
    fn request(&self, req: &RequestDescriptor) -> Result<HttpResponse, ApiError> {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(req.timeout)
            .tls_config(
                TlsConfig::builder()
                    .disable_verification(!req.verify_ssl)
                    .build(),
            )
            .build()
            .new_agent();

        let url = target_url(req)?;
        let result = match req.method {
            HttpMethod::Get => {
                if matches!(req.body, RequestBody::Raw(ref raw) if !raw.is_empty()) {
                    debug!(url = %url, "raw body dropped on GET");
                }
                let mut builder = agent.get(url.as_str());
                for (k, v) in req.headers.iter() {
                    builder = builder.header(k, v);
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = agent.post(url.as_str());
                for (k, v) in req.headers.iter() {
                    builder = builder.header(k, v);
                }
                builder.send(req.body.encode().as_bytes())
            }
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
