mod common;

use axum::http::{Method, StatusCode};
use common::{app, app_with, empty_request, registry_with, send};

#[tokio::test]
async fn health_is_always_ok() {
    let (status, _) = send(&app(), empty_request(Method::GET, "/api/health", None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn db_health_follows_the_store() {
    let (status, _) = send(&app(), empty_request(Method::GET, "/api/health/db", None)).await;
    assert_eq!(status, StatusCode::OK);

    let down = app_with(registry_with(false));
    let (status, _) = send(&down, empty_request(Method::GET, "/api/health/db", None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
