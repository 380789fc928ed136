//! MCP server implementation with newline-delimited JSON-RPC handling.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::{
    config::ServerConfig,
    prompts::{PromptError, PromptRegistry},
    protocol::{
        CallToolParams, GetPromptParams, InitializeParams, InitializeResult, JsonRpcError,
        JsonRpcRequest, JsonRpcResponse, ListChangedCapability, ListPromptsResult,
        ListToolsResult, PROTOCOL_VERSION, ServerCapabilities, ServerInfo, error_codes,
    },
    tools::{RegistryError, ToolRegistry},
};

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "nimbus";

/// Errors that can occur in the MCP server.
#[derive(Debug, Error)]
pub enum McpError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// MCP server dispatching JSON-RPC requests to tools and prompts.
///
/// Transports call [`McpServer::handle_message`]; the stdio loop lives in
/// [`McpServer::serve`].
pub struct McpServer {
    tools: ToolRegistry,
    prompts: PromptRegistry,
    initialized: AtomicBool,
}

impl McpServer {
    pub fn new(tools: ToolRegistry, prompts: PromptRegistry) -> Self {
        Self {
            tools,
            prompts,
            initialized: AtomicBool::new(false),
        }
    }

    /// Build a server with upstream clients created from configuration.
    pub fn from_config(config: &ServerConfig) -> Result<Self, RegistryError> {
        let tools = ToolRegistry::from_config(config)?;
        let prompts = PromptRegistry::new(tools.state().nws.clone());
        Ok(Self::new(tools, prompts))
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Run the server, reading from stdin and writing to stdout.
    pub async fn run(&self) -> Result<(), McpError> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve one JSON-RPC message per line until the reader is exhausted.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<(), McpError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("MCP server starting");

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            debug!(request = %line, "received request");

            if let Some(response) = self.handle_line(&line).await {
                let mut response_json = serde_json::to_string(&response)?;
                debug!(response = %response_json, "sending response");
                response_json.push('\n');
                writer.write_all(response_json.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        info!("MCP server shutting down");
        Ok(())
    }

    /// Handle one raw line. Returns `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!(error = %e, "failed to parse request");
                // Id is unknown, so the error carries an explicit null
                return Some(JsonRpcResponse::error(
                    Some(Value::Null),
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                ));
            }
        };

        self.handle_message(&request).await
    }

    /// Handle a decoded request. Returns `None` for notifications.
    pub async fn handle_message(&self, request: &JsonRpcRequest) -> Option<JsonRpcResponse> {
        // Notifications (no id) never get a response
        if request.id.is_none() {
            self.handle_notification(request);
            return None;
        }

        let id = request.id.clone();
        Some(match self.handle_request(request).await {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, e.code, e.message),
        })
    }

    fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "notifications/initialized" => {
                debug!("client sent initialized notification");
            }
            "notifications/cancelled" => {
                debug!("client cancelled request");
            }
            _ => {
                debug!(method = %request.method, "unknown notification");
            }
        }
    }

    async fn handle_request(&self, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "ping" => Ok(json!({})),
            "tools/list" => self.handle_list_tools(),
            "tools/call" => self.handle_call_tool(request).await,
            "prompts/list" => self.handle_list_prompts(),
            "prompts/get" => self.handle_get_prompt(request).await,
            _ => Err(rpc_error(
                error_codes::METHOD_NOT_FOUND,
                format!("Unknown method: {}", request.method),
            )),
        }
    }

    fn handle_initialize(&self, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        let params: InitializeParams = parse_params(request, "initialize")?;
        debug!(
            client = %params.client_info.name,
            client_version = %params.client_info.version,
            protocol = %params.protocol_version,
            "client initializing"
        );

        self.initialized.store(true, Ordering::Release);

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                prompts: Some(ListChangedCapability {
                    list_changed: false,
                }),
                tools: Some(ListChangedCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        to_result(&result)
    }

    fn handle_list_tools(&self) -> Result<Value, JsonRpcError> {
        to_result(&ListToolsResult {
            tools: self.tools.definitions(),
        })
    }

    async fn handle_call_tool(&self, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = parse_params(request, "call")?;

        debug!(tool = %params.name, "executing tool");

        let result = self.tools.execute(&params.name, &params.arguments).await;
        to_result(&result)
    }

    fn handle_list_prompts(&self) -> Result<Value, JsonRpcError> {
        to_result(&ListPromptsResult {
            prompts: self.prompts.definitions(),
        })
    }

    async fn handle_get_prompt(&self, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        let params: GetPromptParams = parse_params(request, "prompt")?;

        debug!(prompt = %params.name, "rendering prompt");

        match self.prompts.get(&params.name, &params.arguments).await {
            Ok(result) => to_result(&result),
            Err(e @ (PromptError::UnknownPrompt(_) | PromptError::MissingArgument(_))) => {
                warn!(error = %e, "prompt request rejected");
                Err(rpc_error(error_codes::INVALID_PARAMS, e.to_string()))
            }
            Err(e) => Err(rpc_error(error_codes::INTERNAL_ERROR, e.to_string())),
        }
    }
}

fn rpc_error(code: i32, message: impl Into<String>) -> JsonRpcError {
    JsonRpcError {
        code,
        message: message.into(),
        data: None,
    }
}

fn parse_params<T: DeserializeOwned>(
    request: &JsonRpcRequest,
    what: &str,
) -> Result<T, JsonRpcError> {
    let params = request.params.clone().ok_or_else(|| {
        rpc_error(
            error_codes::INVALID_PARAMS,
            format!("Missing {} params", what),
        )
    })?;

    serde_json::from_value(params).map_err(|e| {
        rpc_error(
            error_codes::INVALID_PARAMS,
            format!("Invalid {} params: {}", what, e),
        )
    })
}

fn to_result<T: Serialize>(value: &T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| rpc_error(error_codes::INTERNAL_ERROR, e.to_string()))
}
