//! MCP (Model Context Protocol) server for weather and web search.
//!
//! Exposes National Weather Service alerts and forecasts, Brave web search,
//! and an event-suggestion prompt to MCP clients via JSON-RPC over
//! stdin/stdout or HTTP.

pub mod config;
pub mod http;
pub mod nws;
pub mod prompts;
pub mod protocol;
pub mod search;
pub mod server;
pub mod tools;

pub use config::ServerConfig;
pub use nws::{NwsClient, NwsError};
pub use prompts::{PromptError, PromptRegistry};
pub use search::{BraveClient, SearchError, SearchProvider};
pub use server::{McpError, McpServer};
pub use tools::{RegistryError, ToolRegistry};
