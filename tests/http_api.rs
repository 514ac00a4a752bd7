//! End-to-end tests of the HTTP surface, driven through the axum router.

#![cfg(feature = "http")]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use agent_tool_servers::core::transport::HttpConfig;
use agent_tool_servers::core::transport::http::router;
use agent_tool_servers::{Config, McpServer, ServerKind};

fn app(kind: ServerKind) -> Router {
    let server = McpServer::new(Config::for_server(kind)).unwrap();
    router(server, &HttpConfig::for_server(kind))
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn health_reports_server_name() {
    let (status, body) = send(app(ServerKind::Web), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["server"], "web_tools");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn root_lists_endpoints() {
    let (status, body) = send(app(ServerKind::Research), Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endpoints"]["rpc"], "/mcp");
    assert_eq!(body["tools"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn tools_listing_matches_server() {
    for (kind, count) in [
        (ServerKind::Research, 4),
        (ServerKind::Document, 8),
        (ServerKind::Data, 10),
        (ServerKind::Web, 8),
    ] {
        let (status, body) = send(app(kind), Method::GET, "/tools", None).await;
        assert_eq!(status, StatusCode::OK);
        let tools = body.as_array().unwrap();
        assert_eq!(tools.len(), count, "tool count for {}", kind);
        assert!(tools.iter().all(|t| t["inputSchema"].is_object()));
    }
}

#[tokio::test]
async fn calculate_statistics_over_http() {
    let (status, body) = send(
        app(ServerKind::Data),
        Method::POST,
        "/tools/calculate_statistics",
        Some(json!({"numbers": [1, 2, 3, 4]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mean"], 2.5);
    assert_eq!(body["median"], 2.5);
    assert_eq!(body["min"], 1.0);
    assert_eq!(body["max"], 4.0);
}

#[tokio::test]
async fn find_duplicates_over_http() {
    let (status, body) = send(
        app(ServerKind::Data),
        Method::POST,
        "/tools/find_duplicates",
        Some(json!({"items": [1, 2, 2, 3, 3, 3]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_duplicates"], true);
    assert_eq!(body["duplicates"], json!({"2": 2, "3": 3}));
}

#[tokio::test]
async fn parse_url_over_http() {
    let (status, body) = send(
        app(ServerKind::Web),
        Method::POST,
        "/tools/parse_url",
        Some(json!({"url": "https://example.com/a?b=1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scheme"], "https");
    assert_eq!(body["domain"], "example.com");
    assert_eq!(body["path"], "/a");
    assert_eq!(body["query_params"], json!({"b": "1"}));
}

#[tokio::test]
async fn unknown_tool_is_404() {
    let (status, body) = send(
        app(ServerKind::Data),
        Method::POST,
        "/tools/fetch_webpage",
        Some(json!({"url": "https://example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "tool_not_found");
}

#[tokio::test]
async fn missing_argument_is_400() {
    let (status, body) = send(app(ServerKind::Data), Method::POST, "/tools/validate_email", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_arguments");
    assert!(body["error"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn malformed_body_is_400() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/tools/validate_email")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app(ServerKind::Data).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blocked_url_is_403() {
    let (status, body) = send(
        app(ServerKind::Web),
        Method::POST,
        "/tools/fetch_webpage",
        Some(json!({"url": "http://127.0.0.1:9/"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "blocked");
}

#[tokio::test]
async fn mcp_tools_list() {
    let (status, body) = send(
        app(ServerKind::Document),
        Method::POST,
        "/mcp",
        Some(json!({"jsonrpc": "2.0", "id": 7, "method": "tools/list"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 7);
    let names: Vec<&str> = body["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    assert!(names.contains(&"extract_text_from_pdf"));
    assert!(names.contains(&"extract_urls_from_text"));
}

#[tokio::test]
async fn mcp_tools_call() {
    let (status, body) = send(
        app(ServerKind::Data),
        Method::POST,
        "/mcp",
        Some(json!({
            "jsonrpc": "2.0",
            "id": "call-1",
            "method": "tools/call",
            "params": {"name": "normalize_whitespace", "arguments": {"text": "a   b"}}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["isError"], false);
    assert_eq!(body["result"]["content"][0]["text"], "a b");
}

#[tokio::test]
async fn mcp_notification_is_accepted() {
    let (status, body) = send(
        app(ServerKind::Data),
        Method::POST,
        "/mcp",
        Some(json!({"jsonrpc": "2.0", "method": "notifications/initialized"})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body, Value::Null);
}
