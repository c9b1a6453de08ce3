//! MCP (Model Context Protocol) server library.
//!
//! This crate provides a minimal MCP server speaking line-delimited
//! JSON-RPC 2.0 over stdio. It handles `initialize`, `ping`,
//! `tools/list` and `tools/call`, and forwards tool calls to a
//! [`ToolHandler`].
//!
//! # Example
//!
//! ```ignore
//! use mcp::{Server, ServerInfo};
//!
//! # async fn example(tools: impl mcp::ToolHandler) -> mcp::Result<()> {
//! let info = ServerInfo {
//!     name: "iati-mcp".to_string(),
//!     version: env!("CARGO_PKG_VERSION").to_string(),
//! };
//!
//! Server::new(info, tools).serve_stdio().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod protocol;
mod server;

pub use error::{Error, Result};
pub use protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, ListToolsResult, PROTOCOL_VERSION, RequestId,
    ServerCapabilities, ServerInfo, Tool, ToolContent,
};
pub use server::{MAX_MESSAGE_SIZE, Server, ToolHandler};
