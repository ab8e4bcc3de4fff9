//! A minimal admin UI serving the settings page.
//!
//! `Plugin::init` runs against a `PageRegistry`, which records the setting,
//! options page and action links the component asks for; the router then
//! serves exactly those. Routes:
//!
//! - `GET /` lists the component with its action links.
//! - `GET /options-general.php?page={slug}` renders the settings page.
//! - `POST /options.php` decodes a submission and saves it.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, sync::Mutex};
use tracing::{info, warn};
use webservice_core::{form, AdminRegistrar, ApiError, Persistence, Plugin, SettingsStore};

/// What the component registered at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRegistry {
    pub settings: Vec<String>,
    /// `(page title, slug)` of each options page.
    pub pages: Vec<(String, String)>,
    pub capabilities: Vec<String>,
    pub action_links: Vec<String>,
}

impl AdminRegistrar for PageRegistry {
    fn register_setting(&mut self, bundle_id: &str) {
        self.settings.push(bundle_id.to_string());
    }

    fn add_options_page(&mut self, page_title: &str, _menu_title: &str, capability: &str, slug: &str) {
        self.pages.push((page_title.to_string(), slug.to_string()));
        self.capabilities.push(capability.to_string());
    }

    fn add_action_link(&mut self, html: &str) {
        self.action_links.insert(0, html.to_string());
    }
}

pub struct AdminState<P> {
    plugin: Plugin,
    registry: PageRegistry,
    store: Mutex<SettingsStore<P>>,
}

impl<P: Persistence> AdminState<P> {
    pub fn new(plugin: Plugin, store: SettingsStore<P>) -> Self {
        let mut registry = PageRegistry::default();
        plugin.init(&mut registry);
        Self {
            plugin,
            registry,
            store: Mutex::new(store),
        }
    }

    pub fn registry(&self) -> &PageRegistry {
        &self.registry
    }
}

pub fn app<P: Persistence + Send + 'static>(state: Arc<AdminState<P>>) -> Router {
    Router::new()
        .route("/", get(index::<P>))
        .route("/options-general.php", get(options_page::<P>))
        .route("/options.php", post(save_options::<P>))
        .with_state(state)
}

pub async fn run<P: Persistence + Send + 'static>(
    listener: TcpListener,
    state: Arc<AdminState<P>>,
) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "admin server listening");
    }
    axum::serve(listener, app(state)).await
}

/// Maps store failures to a 500 page.
struct AdminError(ApiError);

impl From<ApiError> for AdminError {
    fn from(error: ApiError) -> Self {
        AdminError(error)
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        warn!(error = %self.0, "admin request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

async fn index<P: Persistence + Send + 'static>(State(state): State<Arc<AdminState<P>>>) -> Html<String> {
    let links = state.registry.action_links.join(" | ");
    Html(format!(
        "<table class=\"plugins\"><tr><td>{}</td><td>{links}</td></tr></table>",
        state.plugin.display_name()
    ))
}

async fn options_page<P: Persistence + Send + 'static>(
    State(state): State<Arc<AdminState<P>>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Response, AdminError> {
    let Some(slug) = query.get("page") else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };
    let Some((title, _)) = state.registry.pages.iter().find(|(_, s)| s == slug) else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };

    let mut store = state.store.lock().await;
    let bundle = store.load(slug)?;
    let page = form::render_page(title, store.fields(), &bundle, slug);
    Ok(Html(page).into_response())
}

async fn save_options<P: Persistence + Send + 'static>(
    State(state): State<Arc<AdminState<P>>>,
    body: String,
) -> Result<Response, AdminError> {
    let option_page = url::form_urlencoded::parse(body.as_bytes())
        .find(|(k, _)| k == "option_page")
        .map(|(_, v)| v.into_owned());
    let Some(id) = option_page.filter(|id| state.registry.settings.contains(id)) else {
        return Ok((StatusCode::BAD_REQUEST, "unknown option page").into_response());
    };

    let input = form::parse_submission(&id, &body);
    state.store.lock().await.save(&id, input)?;
    info!(bundle = %id, "settings updated");
    Ok(Redirect::to(&format!("/options-general.php?page={id}&settings-updated=true")).into_response())
}
