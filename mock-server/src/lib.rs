use std::collections::BTreeMap;

use axum::{
    extract::Path,
    http::{HeaderMap, Method, StatusCode, Uri},
    routing::any,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What the server saw, echoed back as JSON.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub path: String,
    /// Query string parameters.
    pub args: BTreeMap<String, String>,
    /// Header names are lower-case.
    pub headers: BTreeMap<String, String>,
    /// The body decoded as `application/x-www-form-urlencoded`, whatever the
    /// declared content type.
    pub form: BTreeMap<String, String>,
    /// The raw body.
    pub data: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/anything", any(anything))
        .route("/anything/{*rest}", any(anything))
        .route("/status/{code}", any(status))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn anything(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Echo> {
    Json(echo(&method, &uri, &headers, body))
}

async fn status(Path(code): Path<u16>) -> (StatusCode, String) {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, format!("status {code}")),
        Err(_) => (StatusCode::BAD_REQUEST, format!("invalid status {code}")),
    }
}

fn echo(method: &Method, uri: &Uri, headers: &HeaderMap, body: String) -> Echo {
    Echo {
        method: method.as_str().to_string(),
        path: uri.path().to_string(),
        args: decode_pairs(uri.query().unwrap_or("")),
        headers: headers
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect(),
        form: decode_pairs(&body),
        data: body,
    }
}

fn decode_pairs(encoded: &str) -> BTreeMap<String, String> {
    url::form_urlencoded::parse(encoded.as_bytes())
        .into_owned()
        .collect()
}
