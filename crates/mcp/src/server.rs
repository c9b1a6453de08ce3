//! MCP server over line-delimited stdio.

use std::future::Future;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, ListToolsResult, PROTOCOL_VERSION, ServerCapabilities,
    ServerInfo, Tool, ToolsCapability,
};

/// Maximum accepted message size (1MB).
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Trait for the tool set a server exposes.
///
/// This is the boundary between protocol framing and tool side effects.
/// Tool failures are reported inside the [`CallToolResult`], not as
/// protocol errors.
pub trait ToolHandler: Send + Sync {
    /// Tool definitions for tools/list.
    fn tools(&self) -> Vec<Tool>;

    /// Execute a tool by name.
    fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> impl Future<Output = CallToolResult> + Send;
}

/// An MCP server dispatching requests to a [`ToolHandler`].
pub struct Server<H> {
    info: ServerInfo,
    instructions: Option<String>,
    handler: H,
}

impl<H: ToolHandler> Server<H> {
    pub fn new(info: ServerInfo, handler: H) -> Self {
        Self {
            info,
            instructions: None,
            handler,
        }
    }

    /// Usage hints returned from initialize.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Serve on the process stdin/stdout until stdin closes.
    pub async fn serve_stdio(&self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve one message per line from `reader`, writing responses to `writer`.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(name = %self.info.name, "MCP server started");
        let mut line = String::new();

        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            let Some(response) = self.handle_line(&line).await else {
                continue;
            };

            let response_json = serde_json::to_string(&response)?;
            writer.write_all(response_json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        info!("stdin closed, MCP server stopping");
        Ok(())
    }

    /// Handle one raw message. Returns `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        if line.len() > MAX_MESSAGE_SIZE {
            warn!(size = line.len(), "rejecting oversized message");
            return Some(JsonRpcResponse::failure(
                None,
                JsonRpcError::invalid_request(format!(
                    "message too large: {} bytes (max {MAX_MESSAGE_SIZE})",
                    line.len()
                )),
            ));
        }

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "unparseable message");
                return Some(JsonRpcResponse::failure(None, JsonRpcError::parse_error(e)));
            }
        };

        if request.is_notification() {
            debug!(method = %request.method, "notification");
            return None;
        }

        let id = request.id.clone();
        let response = match self.dispatch(request).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(id, error),
        };
        Some(response)
    }

    async fn dispatch(&self, request: JsonRpcRequest) -> std::result::Result<Value, JsonRpcError> {
        debug!(method = %request.method, "request");
        match request.method.as_str() {
            "initialize" => {
                let params: InitializeParams = parse_params(request.params)?;
                if let Some(client) = &params.client_info {
                    info!(client = %client.name, "client connected");
                }
                to_value(InitializeResult {
                    protocol_version: PROTOCOL_VERSION.to_string(),
                    capabilities: ServerCapabilities {
                        tools: Some(ToolsCapability::default()),
                    },
                    server_info: self.info.clone(),
                    instructions: self.instructions.clone(),
                })
            }
            "ping" => Ok(Value::Object(Default::default())),
            "tools/list" => to_value(ListToolsResult {
                tools: self.handler.tools(),
            }),
            "tools/call" => {
                let params: CallToolParams = parse_params(request.params)?;
                let arguments = params
                    .arguments
                    .unwrap_or_else(|| Value::Object(Default::default()));
                let result = self.handler.call_tool(&params.name, arguments).await;
                to_value(result)
            }
            other => Err(JsonRpcError::method_not_found(other)),
        }
    }
}

fn parse_params<P: serde::de::DeserializeOwned>(
    params: Option<Value>,
) -> std::result::Result<P, JsonRpcError> {
    let value = match params {
        None | Some(Value::Null) => Value::Object(Default::default()),
        Some(value) => value,
    };
    serde_json::from_value(value).map_err(JsonRpcError::invalid_params)
}

fn to_value(result: impl serde::Serialize) -> std::result::Result<Value, JsonRpcError> {
    serde_json::to_value(result).map_err(JsonRpcError::internal)
}
