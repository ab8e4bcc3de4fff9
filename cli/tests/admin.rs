use std::sync::Arc;

use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;
use webservice_cli::admin_server::{app, AdminState};
use webservice_core::{webservice_fields, MemoryPersistence, Plugin, SettingsStore};

const ID: &str = "znwp_webservice_plugin_options";

fn state() -> Arc<AdminState<MemoryPersistence>> {
    let plugin = Plugin::new("ZnWP WebService Plugin", "ZnWP_WebService");
    let store = SettingsStore::new(MemoryPersistence::new(), webservice_fields());
    Arc::new(AdminState::new(plugin, store))
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn submit(body: String) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri("/options.php")
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(body)
        .unwrap()
}

#[test]
fn init_registers_one_page() {
    let state = state();
    let registry = state.registry();
    assert_eq!(registry.settings, vec![ID.to_string()]);
    assert_eq!(
        registry.pages,
        vec![("ZnWP WebService".to_string(), ID.to_string())]
    );
    assert_eq!(registry.capabilities, vec!["manage_options".to_string()]);
    assert_eq!(registry.action_links.len(), 1);
}

#[tokio::test]
async fn index_shows_settings_link() {
    let resp = app(state()).oneshot(get("/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains(&format!("options-general.php?page={ID}")));
}

#[tokio::test]
async fn options_page_renders_defaults() {
    let resp = app(state())
        .oneshot(get(&format!("/options-general.php?page={ID}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("<h2>ZnWP WebService Settings</h2>"));
    assert!(html.contains(&format!(
        r#"<input name="{ID}[url]" type="text" value="http://httpbin.org/" size="100" />"#
    )));
}

#[tokio::test]
async fn unknown_page_is_404() {
    let resp = app(state())
        .oneshot(get("/options-general.php?page=other_options"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app(state()).oneshot(get("/options-general.php")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn submission_is_saved_and_rendered() {
    let state = state();
    let body = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("option_page", ID)
        .append_pair(&format!("{ID}[method]"), "POST")
        .append_pair(&format!("{ID}[headers]"), "<b>X-A=1</b>")
        .finish();

    let resp = app(state.clone()).oneshot(submit(body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers()[http::header::LOCATION],
        format!("/options-general.php?page={ID}&settings-updated=true")
    );

    let resp = app(state)
        .oneshot(get(&format!("/options-general.php?page={ID}")))
        .await
        .unwrap();
    let html = body_text(resp).await;
    assert!(html.contains(r#"<option value="POST" selected="selected">POST</option>"#));
    assert!(html.contains("<b>X-A=1</b></textarea>"));
    // Fields missing from the submission fall back to their defaults.
    assert!(html.contains(r#"value="http://httpbin.org/""#));
}

#[tokio::test]
async fn submission_for_unregistered_page_is_rejected() {
    let body = "option_page=elsewhere&elsewhere%5Bmethod%5D=POST".to_string();
    let resp = app(state()).oneshot(submit(body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
