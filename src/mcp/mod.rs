//! MCP tool surface: catalogue, dispatch and per-tool handlers.

pub mod handlers;
pub mod tools;
