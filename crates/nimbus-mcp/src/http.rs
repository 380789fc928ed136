//! HTTP transport for the MCP server.
//!
//! Exposes the same JSON-RPC handling as the stdio transport over
//! `POST /mcp`, plus a `GET /health` probe. Requests are handled
//! concurrently; tools share no mutable state.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{debug, info};

use crate::{protocol::JsonRpcRequest, server::McpServer};

/// Create an axum router for the MCP HTTP server.
pub fn create_router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp))
        .route("/health", get(handle_health))
        .with_state(server)
}

/// Handle MCP JSON-RPC requests.
async fn handle_mcp(
    State(server): State<Arc<McpServer>>,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    debug!(method = %request.method, "received MCP request");

    match server.handle_message(&request).await {
        Some(resp) => {
            debug!(id = ?resp.id, "sending MCP response");
            (StatusCode::OK, Json(resp)).into_response()
        }
        // Notifications get no body
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Health check endpoint.
async fn handle_health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Run the MCP HTTP server on the specified port.
pub async fn run_server(server: McpServer, port: u16) -> Result<(), std::io::Error> {
    let router = create_router(Arc::new(server));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("MCP HTTP server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    info!("received shutdown signal");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn create_test_server() -> Arc<McpServer> {
        let config = ServerConfig::default().with_nws_base_url("http://127.0.0.1:1");
        Arc::new(McpServer::from_config(&config).unwrap())
    }

    fn post_json(body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/mcp")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(body).unwrap()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let router = create_router(create_test_server());

        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_mcp_initialize() {
        let router = create_router(create_test_server());

        let response = router
            .oneshot(post_json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "test", "version": "1.0.0"}
                }
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["id"], 1);
        assert_eq!(json["result"]["serverInfo"]["name"], "nimbus");
    }

    #[tokio::test]
    async fn test_mcp_tools_call() {
        let router = create_router(create_test_server());

        let response = router
            .oneshot(post_json(&json!({
                "jsonrpc": "2.0",
                "id": 2,
                "method": "tools/call",
                "params": {"name": "add_numbers", "arguments": {"a": 1.5, "b": 2}}
            })))
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["result"]["content"][0]["text"], "The sum of 1.5 and 2 is 3.5");
    }

    #[tokio::test]
    async fn test_mcp_notification_no_content() {
        let router = create_router(create_test_server());

        let response = router
            .oneshot(post_json(&json!({
                "jsonrpc": "2.0",
                "method": "notifications/initialized"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_mcp_unknown_method() {
        let router = create_router(create_test_server());

        let response = router
            .oneshot(post_json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "unknown/method"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert!(
            json["error"]["message"]
                .as_str()
                .unwrap()
                .contains("Unknown method")
        );
    }
}
