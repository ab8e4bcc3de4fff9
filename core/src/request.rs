//! Compiling settings into an outbound request.
//!
//! # Design
//! Headers start from the `Content-Type` setting and then take every parsed
//! line of the `headers` setting, so a line naming `Content-Type` wins. The
//! body is the parsed `data` setting. Caller overrides are a shallow
//! replace: an override that carries `headers` swaps out the whole map
//! instead of merging into it.

use std::time::Duration;

use serde::Serialize;

use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::kv::{self, KeyValueMap};
use crate::settings::SettingsBundle;

/// Request payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RequestBody {
    /// Key-value parameters, form-encoded by the transport.
    Form(KeyValueMap),
    /// Sent verbatim.
    Raw(String),
}

impl RequestBody {
    pub fn is_empty(&self) -> bool {
        match self {
            RequestBody::Form(params) => params.is_empty(),
            RequestBody::Raw(raw) => raw.is_empty(),
        }
    }

    /// Wire form of the body: `application/x-www-form-urlencoded` for
    /// parameters, the text itself for a raw body.
    pub fn encode(&self) -> String {
        match self {
            RequestBody::Form(params) => url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(params.iter())
                .finish(),
            RequestBody::Raw(raw) => raw.clone(),
        }
    }
}

/// Everything a transport needs to perform one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestDescriptor {
    pub url: String,
    pub method: HttpMethod,
    pub headers: KeyValueMap,
    pub body: RequestBody,
    pub verify_ssl: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

/// Caller-supplied replacements for individual descriptor fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOverrides {
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    pub headers: Option<KeyValueMap>,
    pub body: Option<RequestBody>,
    pub verify_ssl: Option<bool>,
    pub timeout: Option<Duration>,
}

impl RequestOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn headers(mut self, headers: KeyValueMap) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.verify_ssl = Some(verify_ssl);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Headers and body parameters derived once from a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSettings {
    url: String,
    method: String,
    headers: KeyValueMap,
    body: KeyValueMap,
    verify_ssl: bool,
}

impl CompiledSettings {
    pub fn from_bundle(bundle: &SettingsBundle) -> Self {
        let mut headers = KeyValueMap::new();
        headers.insert("Content-Type", bundle.get_str("content_type"));
        headers.extend_from(&kv::parse(bundle.get_str("headers")));

        Self {
            url: bundle.get_str("url").to_string(),
            method: bundle.get_str("method").to_string(),
            headers,
            body: kv::parse(bundle.get_str("data")),
            verify_ssl: bundle.get("sslverify").is_some_and(|v| v.is_truthy()),
        }
    }

    /// Build a descriptor, applying `override_url` and then `overrides`.
    ///
    /// The stored method is only parsed when no override replaces it.
    pub fn build(
        &self,
        override_url: Option<&str>,
        overrides: Option<&RequestOverrides>,
    ) -> Result<RequestDescriptor, ApiError> {
        let mut url = match override_url {
            Some(u) if !u.is_empty() => u.to_string(),
            _ => self.url.clone(),
        };
        let Some(o) = overrides else {
            return Ok(RequestDescriptor {
                url,
                method: self.method.parse()?,
                headers: self.headers.clone(),
                body: RequestBody::Form(self.body.clone()),
                verify_ssl: self.verify_ssl,
                timeout: None,
            });
        };

        if let Some(u) = &o.url {
            url = u.clone();
        }
        let method = match o.method {
            Some(m) => m,
            None => self.method.parse()?,
        };
        Ok(RequestDescriptor {
            url,
            method,
            headers: o.headers.clone().unwrap_or_else(|| self.headers.clone()),
            body: o
                .body
                .clone()
                .unwrap_or_else(|| RequestBody::Form(self.body.clone())),
            verify_ssl: o.verify_ssl.unwrap_or(self.verify_ssl),
            timeout: o.timeout,
        })
    }
}

/// Compile `bundle` into a descriptor in one step.
pub fn build_request(
    bundle: &SettingsBundle,
    override_url: Option<&str>,
    overrides: Option<&RequestOverrides>,
) -> Result<RequestDescriptor, ApiError> {
    CompiledSettings::from_bundle(bundle).build(override_url, overrides)
}
