//! HTTP transport implementation.
//!
//! Two surfaces share one axum router:
//! - REST tool endpoints: `GET /tools` and `POST /tools/{name}`
//! - JSON-RPC 2.0 over POST on the configured MCP path
//!
//! This allows standard HTTP clients (curl, agent frameworks) and MCP clients
//! to use the same server.

use ::http::StatusCode;
use axum::{
    Json, Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::McpServer;
use crate::domains::tools::ToolError;

/// MCP protocol revision reported by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<serde_json::Value>,
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<serde_json::Value>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<serde_json::Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Parse error.
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::error(None, -32700, msg)
    }

    /// Method not found error.
    pub fn method_not_found(id: Option<serde_json::Value>) -> Self {
        Self::error(id, -32601, "Method not found")
    }

    /// Invalid request error.
    pub fn invalid_request(id: Option<serde_json::Value>) -> Self {
        Self::error(id, -32600, "Invalid Request")
    }

    /// Invalid params error.
    pub fn invalid_params(id: Option<serde_json::Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32602, msg)
    }
}

/// Error body returned by the REST endpoints.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

/// HTTP status for a tool failure.
pub fn status_for(err: &ToolError) -> StatusCode {
    match err {
        ToolError::NotFound(_) | ToolError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
        ToolError::InvalidArguments(_) => StatusCode::BAD_REQUEST,
        ToolError::Fetch(_) => StatusCode::BAD_GATEWAY,
        ToolError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        ToolError::Parse(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ToolError::Blocked(_) => StatusCode::FORBIDDEN,
        ToolError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ToolError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let body = ErrorBody {
            error: self.to_string(),
            kind: self.kind(),
        };
        (status, Json(body)).into_response()
    }
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
struct AppState {
    server: McpServer,
    rpc_path: String,
}

/// Build the axum router for a server.
pub fn router(server: McpServer, config: &HttpConfig) -> Router {
    let state = AppState {
        server,
        rpc_path: config.rpc_path.clone(),
    };

    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/tools", get(list_tools))
        .route("/tools/{name}", post(call_tool))
        .route(&config.rpc_path, post(handle_rpc))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Run the HTTP transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();
        let name = server.name().to_string();
        let app = router(server, &self.config);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!("{} ready - listening on {} (CORS {})", name, addr, cors_status);
        info!("  → Tools:    GET /tools, POST /tools/{{name}}");
        info!("  → JSON-RPC: POST {}", self.config.rpc_path);
        info!("  → Health:   GET /health");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(TransportError::Serve)?;

        info!("{} stopped", name);
        Ok(())
    }
}

/// Resolve on Ctrl-C so in-flight requests can finish.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Root handler - provides API info.
async fn root_handler(
    State(AppState { server, rpc_path }): State<AppState>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": server.name(),
        "version": server.version(),
        "description": server.kind().summary(),
        "tools": server.registry().tool_names(),
        "endpoints": {
            "health": "/health",
            "tools": "/tools",
            "call": "/tools/{name}",
            "rpc": rpc_path
        }
    }))
}

/// Health check endpoint.
async fn health_check(State(AppState { server, .. }): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "server": server.name(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// List the server's tools.
async fn list_tools(State(AppState { server, .. }): State<AppState>) -> impl IntoResponse {
    Json(server.list_tools())
}

/// Call one tool with the request body as its arguments.
#[instrument(skip(server, body))]
async fn call_tool(
    State(AppState { server, .. }): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ToolError> {
    let arguments = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::json!({})
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ToolError::invalid_arguments(format!("Invalid JSON body: {}", e)))?
    };

    server.call_tool(&name, arguments).await.map(Json)
}

/// Handle JSON-RPC requests.
#[instrument(skip_all, fields(method))]
async fn handle_rpc(State(AppState { server, .. }): State<AppState>, body: Bytes) -> Response {
    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Malformed JSON-RPC message: {}", e);
            return Json(JsonRpcResponse::parse_error(e.to_string())).into_response();
        }
    };

    tracing::Span::current().record("method", request.method.as_str());
    info!("Received JSON-RPC request: {}", request.method);

    if request.method.starts_with("notifications/") {
        info!("Received notification: {}", request.method);
        return StatusCode::ACCEPTED.into_response();
    }

    Json(process_request(&server, request).await).into_response()
}

/// Process a JSON-RPC request and return the response.
async fn process_request(server: &McpServer, request: JsonRpcRequest) -> JsonRpcResponse {
    if request.jsonrpc != "2.0" {
        return JsonRpcResponse::invalid_request(request.id);
    }

    match request.method.as_str() {
        "initialize" => handle_initialize(server, request),
        "ping" => JsonRpcResponse::success(request.id, serde_json::json!({})),
        "tools/list" => JsonRpcResponse::success(
            request.id,
            serde_json::json!({ "tools": server.list_tools() }),
        ),
        "tools/call" => handle_tools_call(server, request).await,
        _ => {
            warn!("Unknown method: {}", request.method);
            JsonRpcResponse::method_not_found(request.id)
        }
    }
}

/// Handle initialize request.
fn handle_initialize(server: &McpServer, request: JsonRpcRequest) -> JsonRpcResponse {
    let result = serde_json::json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": server.name(),
            "version": server.version()
        },
        "instructions": server.instructions()
    });

    JsonRpcResponse::success(request.id, result)
}

/// Handle tools/call request.
///
/// Invalid arguments and unknown tools are protocol errors; other failures
/// are tool results with `isError` set.
async fn handle_tools_call(server: &McpServer, request: JsonRpcRequest) -> JsonRpcResponse {
    let Some(params) = request.params else {
        return JsonRpcResponse::invalid_params(request.id, "Missing params");
    };

    let Some(name) = params.get("name").and_then(|v| v.as_str()) else {
        return JsonRpcResponse::invalid_params(request.id, "Missing tool name");
    };

    let arguments = params
        .get("arguments")
        .cloned()
        .unwrap_or(serde_json::json!({}));

    match server.call_tool(name, arguments).await {
        Ok(value) => {
            let text = match &value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let mut result = serde_json::json!({
                "content": [{ "type": "text", "text": text }],
                "isError": false
            });
            if value.is_object() {
                result["structuredContent"] = value;
            }
            JsonRpcResponse::success(request.id, result)
        }
        Err(e @ (ToolError::InvalidArguments(_) | ToolError::NotFound(_))) => {
            JsonRpcResponse::invalid_params(request.id, e.to_string())
        }
        Err(e) => JsonRpcResponse::success(
            request.id,
            serde_json::json!({
                "content": [{ "type": "text", "text": e.to_string() }],
                "isError": true
            }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Config, ServerKind};

    fn server() -> McpServer {
        McpServer::new(Config::for_server(ServerKind::Data)).unwrap()
    }

    fn rpc(method: &str, params: serde_json::Value) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(serde_json::json!(1)),
            method: method.to_string(),
            params: Some(params),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&ToolError::not_found("x")), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&ToolError::invalid_arguments("x")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&ToolError::fetch("x")), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_for(&ToolError::Timeout("x".into())),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_for(&ToolError::parse("x")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&ToolError::Blocked("x".into())),
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_rpc_rejects_wrong_version() {
        let mut request = rpc("tools/list", serde_json::json!({}));
        request.jsonrpc = "1.0".to_string();
        let response = process_request(&server(), request).await;
        assert_eq!(response.error.unwrap().code, -32600);
    }

    #[tokio::test]
    async fn test_rpc_initialize() {
        let response = process_request(&server(), rpc("initialize", serde_json::json!({}))).await;
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "data_tools");
    }

    #[tokio::test]
    async fn test_rpc_tools_call_structured() {
        let response = process_request(
            &server(),
            rpc(
                "tools/call",
                serde_json::json!({
                    "name": "validate_email",
                    "arguments": {"email": "ada@example.com"}
                }),
            ),
        )
        .await;
        let result = response.result.unwrap();
        assert_eq!(result["isError"], false);
        assert_eq!(result["structuredContent"]["valid"], true);
    }

    #[tokio::test]
    async fn test_rpc_tools_call_bad_arguments() {
        let response = process_request(
            &server(),
            rpc(
                "tools/call",
                serde_json::json!({"name": "validate_email", "arguments": {}}),
            ),
        )
        .await;
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_rpc_tools_call_failure_is_tool_result() {
        let response = process_request(
            &server(),
            rpc(
                "tools/call",
                serde_json::json!({
                    "name": "json_to_csv",
                    "arguments": {"json_data": "not json"}
                }),
            ),
        )
        .await;
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
    }

    #[tokio::test]
    async fn test_rpc_unknown_method() {
        let response = process_request(&server(), rpc("resources/list", serde_json::json!({}))).await;
        assert_eq!(response.error.unwrap().code, -32601);
    }
}
