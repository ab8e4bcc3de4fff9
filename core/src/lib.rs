//! Settings-driven HTTP request helper.
//!
//! # Overview
//! Stores a bundle of named settings (URL, method, content type, TLS
//! verification, extra headers, extra body parameters), renders an admin form
//! for editing them, and compiles them into `RequestDescriptor` values that
//! the host executes. The host also gets the response body back through one
//! helper that tolerates failures.
//!
//! # Design
//! - Host-does-IO: the core builds descriptors and interprets responses; an
//!   `HttpClient` supplied by the caller performs the round-trip.
//! - Storage is a `Persistence` capability; `SettingsStore` adds schema
//!   defaults on top.
//! - Settings values are a tagged `FieldValue` (scalar or sequence) rather
//!   than an untyped map.

pub mod admin;
pub mod error;
pub mod form;
pub mod http;
pub mod kv;
pub mod request;
pub mod schema;
pub mod service;
pub mod settings;

pub use admin::{AdminRegistrar, Plugin};
pub use error::ApiError;
pub use http::{HttpClient, HttpMethod, HttpResponse};
pub use kv::KeyValueMap;
pub use request::{build_request, CompiledSettings, RequestBody, RequestDescriptor, RequestOverrides};
pub use schema::{webservice_fields, FieldDef, FieldKind, FieldSpec, FieldValue, Layout};
pub use service::{ResponseResult, WebService};
pub use settings::{
    bundle_id, JsonFilePersistence, MemoryPersistence, Persistence, SettingsBundle, SettingsStore,
};
