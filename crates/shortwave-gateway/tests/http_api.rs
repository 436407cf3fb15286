use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::header::{
    ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE,
};
use axum::http::{Request, StatusCode};
use axum::Router;
use shortwave_core::{encode, BatchCreated, LinkRecord};
use shortwave_gateway::app::App;
use shortwave_gateway::model::ShortenResponse;
use shortwave_gateway::state::AppState;
use shortwave_storage::{MemoryStore, SqliteStore};
use tower::ServiceExt;

const BASE_URL: &str = "http://localhost:8080";

fn memory_app() -> Router {
    App::router(AppState::new(Arc::new(MemoryStore::new()), BASE_URL))
}

async fn sqlite_app() -> Router {
    let store = SqliteStore::connect("sqlite::memory:")
        .await
        .expect("open in-memory sqlite");
    App::router(AppState::new(Arc::new(store), BASE_URL))
}

fn text_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::from(body.to_owned()))
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

#[tokio::test]
async fn create_then_resolve_redirects() {
    let app = memory_app();

    let response = app
        .clone()
        .oneshot(text_post("/", "https://google.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(response.headers().contains_key(SET_COOKIE));

    let short = String::from_utf8(body_bytes(response).await).unwrap();
    let id = encode("https://google.com");
    assert_eq!(short, format!("{BASE_URL}/{id}"));

    let response = app
        .oneshot(Request::get(format!("/{id}")).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(LOCATION).unwrap(),
        "https://google.com"
    );
}

#[tokio::test]
async fn resolve_unknown_id_is_not_found() {
    let response = memory_app()
        .oneshot(Request::get("/missing").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_create_body_is_rejected() {
    let response = memory_app().oneshot(text_post("/", "  ")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn json_shorten_conflicts_with_existing_short_url() {
    let app = sqlite_app().await;
    let body = r#"{"url":"https://example.com"}"#;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/shorten", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let first: ShortenResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();

    let response = app
        .oneshot(json_request("POST", "/api/shorten", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let second: ShortenResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();

    assert_eq!(first.result, second.result);
}

#[tokio::test]
async fn batch_shorten_answers_in_input_order() {
    let app = sqlite_app().await;
    let body = r#"[
        {"correlation_id":"first","original_url":"https://one.example"},
        {"correlation_id":"second","original_url":"https://two.example"}
    ]"#;

    let response = app
        .oneshot(json_request("POST", "/api/shorten/batch", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created: Vec<BatchCreated> = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0].correlation_id, "first");
    assert_eq!(
        created[0].short_url,
        format!("{BASE_URL}/{}", encode("https://one.example"))
    );
    assert_eq!(created[1].correlation_id, "second");
}

#[tokio::test]
async fn deleted_link_answers_gone() {
    let app = sqlite_app().await;

    app.clone()
        .oneshot(text_post("/", "https://example.com"))
        .await
        .unwrap();
    let id = encode("https://example.com");

    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            "/api/user/urls",
            &format!(r#"["{id}"]"#),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = app
        .oneshot(Request::get(format!("/{id}")).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::GONE);
}

#[tokio::test]
async fn empty_delete_batch_is_rejected() {
    let response = sqlite_app()
        .await
        .oneshot(json_request("DELETE", "/api/user/urls", "[]"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn user_urls_without_token_is_no_content() {
    let response = memory_app()
        .oneshot(
            Request::get("/api/user/urls")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn user_urls_lists_only_the_sessions_links() {
    let app = memory_app();

    // First create mints the session cookie.
    let response = app
        .clone()
        .oneshot(text_post("/", "https://mine.example"))
        .await
        .unwrap();
    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_owned();

    // A link from some other anonymous session.
    app.clone()
        .oneshot(text_post("/", "https://theirs.example"))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::get("/api/user/urls")
                .header(COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let links: Vec<LinkRecord> = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].original_url, "https://mine.example");
}

#[tokio::test]
async fn responses_gzip_when_the_client_accepts_it() {
    let app = memory_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/shorten")
        .header(CONTENT_TYPE, "application/json")
        .header(ACCEPT_ENCODING, "gzip")
        .body(Body::from(
            r#"{"url":"https://a-rather-long-hostname.example/with/a/path/that/keeps/the/answer/large"}"#,
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers().get(CONTENT_ENCODING).unwrap(), "gzip");
}

#[tokio::test]
async fn ping_reports_ok() {
    let response = memory_app()
        .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
