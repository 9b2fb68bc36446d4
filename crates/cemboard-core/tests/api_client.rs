//! API client over the reqwest transport against a mock HTTP server

use cemboard_core::api::{ApiClient, ImageFile};
use cemboard_core::config::ApiConfig;
use cemboard_core::models::PrintPayload;
use cemboard_core::{CoreError, Session};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, session: Session) -> ApiClient {
    let config = ApiConfig {
        base_url: server.uri(),
        api_key: "test-key".to_string(),
        timeout_secs: 5,
        token_path: None,
    };
    ApiClient::from_config(&config, session).unwrap()
}

#[tokio::test]
async fn test_list_cemetery_sends_api_key_without_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cemetery"))
        .and(header("x-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "r1", "name": "Abdul Karim", "graveNumber": "A1", "age": "70"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let records = client_for(&server, Session::anonymous())
        .list_cemetery()
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].age, Some(70.0));

    let received = server.received_requests().await.unwrap();
    assert!(received[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_create_print_sends_bearer_and_camel_case_body() {
    let server = MockServer::start().await;
    let payload = PrintPayload {
        client_name: "Amin".to_string(),
        total_pages: 10.0,
        charge_per_page: 5.0,
        cost_per_page: 3.0,
        ..Default::default()
    }
    .with_computed_totals();

    Mock::given(method("POST"))
        .and(path("/api/prints"))
        .and(header("authorization", "Bearer tok-1"))
        .and(body_json(json!({
            "clientName": "Amin",
            "address": "",
            "phone": "",
            "email": "",
            "totalPages": 10.0,
            "chargePerPage": 5.0,
            "costPerPage": 3.0,
            "totalCharge": 50.0,
            "totalCost": 30.0,
            "profit": 20.0
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"_id": "p1"})))
        .expect(1)
        .mount(&server)
        .await;

    let created = client_for(&server, Session::with_token("tok-1"))
        .create_print(&payload)
        .await
        .unwrap();
    assert_eq!(created["_id"], "p1");
}

#[tokio::test]
async fn test_unauthorized_is_distinguished() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/prints"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "jwt expired"})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/prints/p1"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Invalid id"))
        .mount(&server)
        .await;

    let client = client_for(&server, Session::with_token("stale"));
    assert!(matches!(
        client.list_prints().await,
        Err(CoreError::Unauthorized)
    ));

    match client.delete_print("p1").await {
        Err(CoreError::Status {
            status, message, ..
        }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid id");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn test_upload_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"logo.png\""))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"url": "https://cdn.example/logo.png"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let url = client_for(&server, Session::with_token("t"))
        .upload(&ImageFile::new("logo.png", vec![137, 80, 78, 71]))
        .await
        .unwrap();
    assert_eq!(url, "https://cdn.example/logo.png");
}

#[tokio::test]
async fn test_missing_record_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cemetery/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not found"})))
        .mount(&server)
        .await;

    let record = client_for(&server, Session::anonymous())
        .get_cemetery("gone")
        .await
        .unwrap();
    assert!(record.is_none());
}

#[tokio::test]
async fn test_network_failure_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = ApiConfig {
        base_url: format!("http://127.0.0.1:{port}"),
        api_key: "k".to_string(),
        timeout_secs: 2,
        token_path: None,
    };
    let client = ApiClient::from_config(&config, Session::anonymous()).unwrap();
    assert!(matches!(
        client.list_graves().await,
        Err(CoreError::Transport { .. })
    ));
}
