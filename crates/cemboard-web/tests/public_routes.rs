//! Public routes rendered against a scripted API

use axum::body::Body;
use axum::http::{Request, StatusCode};
use cemboard_core::api::{Method, ScriptedTransport};
use cemboard_core::config::SiteConfig;
use cemboard_core::{ApiClient, Session};
use cemboard_web::{create_router, AppState};
use http_body_util::BodyExt;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

fn app(transport: Arc<ScriptedTransport>) -> axum::Router {
    let client = ApiClient::new(transport, "key", Session::anonymous());
    create_router(AppState::new(client, SiteConfig::default()))
}

fn scripted() -> Arc<ScriptedTransport> {
    let transport = Arc::new(ScriptedTransport::new());
    let graves: Vec<String> = (1..=15)
        .map(|i| format!("A{i}"))
        .chain((1..=12).map(|i| format!("B{i}")))
        .collect();
    transport
        .respond(Method::Get, "/api/graves", 200, json!(graves))
        .respond(
            Method::Get,
            "/api/cemetery",
            200,
            json!([
                {"_id": "r1", "name": "Abdul Karim", "graveNumber": "A1", "age": 70,
                 "deathDate": "2024-01-05", "gender": "Male", "isNative": true},
                {"_id": "r2", "name": "Rahima <b>Begum</b>", "graveNumber": "B2", "age": 8}
            ]),
        )
        .respond(
            Method::Get,
            "/api/notices",
            200,
            json!([
                {"_id": "n1", "title": "Eid prayer", "description": "d", "date": "2024-04-10", "type": "event"},
                {"_id": "n2", "title": "Cleaning", "description": "d", "date": "2024-01-01", "type": "notice"}
            ]),
        );
    transport
}

async fn get(router: axum::Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, location, String::from_utf8_lossy(&bytes).into_owned())
}

#[tokio::test]
async fn test_health_reports_api() {
    let (status, _, body) = get(app(scripted()), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["status"], "healthy");
    assert_eq!(value["graves"], 27);
}

#[tokio::test]
async fn test_health_degraded_without_api() {
    let (_, _, body) = get(app(Arc::new(ScriptedTransport::new())), "/api/health").await;
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["status"], "degraded");
}

#[tokio::test]
async fn test_home_lists_latest_notices() {
    let (status, _, body) = get(app(scripted()), "/").await;
    assert_eq!(status, StatusCode::OK);
    let eid = body.find("Eid prayer").unwrap();
    let cleaning = body.find("Cleaning").unwrap();
    assert!(eid < cleaning);
    assert!(!body.contains("See more"));
}

#[tokio::test]
async fn test_grave_grid_block_filter_and_reveal() {
    let transport = scripted();
    let (status, _, body) = get(app(transport.clone()), "/graves?block=B&show=20").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Total: 27 · Used: 2 · Available: 25"));
    assert!(body.contains(r#"href="/grave/r2""#));
    assert!(body.contains(">B12<"));
    assert!(!body.contains(">A3<"));
    assert!(!body.contains("View more"));

    let (_, _, body) = get(app(transport), "/graves").await;
    assert!(body.contains(">A10<"));
    assert!(!body.contains(">A11<"));
    assert!(body.contains("show=20"));
}

#[tokio::test]
async fn test_grave_grid_huge_show_renders_everything() {
    let uri = format!("/graves?show={}", usize::MAX);
    let (status, _, body) = get(app(scripted()), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(">A15<"));
    assert!(body.contains(">B12<"));
    assert!(!body.contains("View more"));

    let (status, _, body) = get(app(scripted()), "/find?q=a&show=99999999999999").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Abdul Karim"));
}

#[tokio::test]
async fn test_grave_grid_click() {
    let transport = scripted();
    let (status, location, _) = get(app(transport.clone()), "/graves?grave=A1").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/grave/r1"));

    let (status, _, body) = get(app(transport), "/graves?grave=A2").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("This grave is available."));
}

#[tokio::test]
async fn test_grave_detail_and_missing() {
    let transport = scripted();
    transport
        .respond(
            Method::Get,
            "/api/cemetery/r1",
            200,
            json!({"_id": "r1", "name": "Abdul Karim", "graveNumber": "A1", "age": 70,
                   "deathDate": "2024-01-05"}),
        )
        .respond(Method::Get, "/api/cemetery/gone", 404, json!({"message": "Not found"}));

    let (status, _, body) = get(app(transport.clone()), "/grave/r1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("5 January 2024"));
    assert!(body.contains("70 years"));

    let (status, _, body) = get(app(transport), "/grave/gone").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Grave not found"));
}

#[tokio::test]
async fn test_finder_escapes_and_searches() {
    let (status, _, body) = get(app(scripted()), "/find?q=rahima").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Rahima &lt;b&gt;Begum&lt;/b&gt;"));
    assert!(!body.contains("Abdul Karim"));

    let (_, _, body) = get(app(scripted()), "/find?q=nobody").await;
    assert!(body.contains("No records found for your search."));
}

#[tokio::test]
async fn test_notice_detail_redirects_on_failure() {
    let transport = scripted();
    transport.respond(Method::Get, "/api/notices/n1", 500, json!({}));
    let (status, location, _) = get(app(transport), "/notice/n1").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/notices"));
}

#[tokio::test]
async fn test_notice_detail_shows_others() {
    let transport = scripted();
    transport.respond(
        Method::Get,
        "/api/notices/n2",
        200,
        json!({"_id": "n2", "title": "Cleaning", "description": "Friday", "date": "2024-01-01", "type": "notice"}),
    );
    let (status, _, body) = get(app(transport), "/notice/n2").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("More notices"));
    assert!(body.contains(r#"href="/notice/n1""#));
}

#[tokio::test]
async fn test_stats_page() {
    let (status, _, body) = get(app(scripted()), "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<tr><th>Total records</th><td>2</td></tr>"));
    assert!(body.contains("<td>61+</td><td>1</td>"));
}

#[tokio::test]
async fn test_static_pages() {
    for uri in ["/contact", "/location", "/login"] {
        let (status, _, _) = get(app(scripted()), uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
    }
}
