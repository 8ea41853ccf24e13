use std::sync::Arc;

use serde_json::Value;

use crate::config::ForgeConfig;
use crate::error::{ForgeError, ForgeResult};
use crate::github::GitHost;
use crate::ipc::protocol::tool_text;
use crate::llm::CompletionClient;

/// Collaborators shared by every tool call. Cheap to clone.
#[derive(Clone)]
pub struct ToolContext {
    pub llm: Arc<dyn CompletionClient>,
    pub git: Arc<dyn GitHost>,
    pub config: Arc<ForgeConfig>,
}

/// Text handed back to the agent, flagged when it describes a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }

    /// MCP `tools/call` result shape.
    pub fn into_content(self) -> Value {
        tool_text(self.text, self.is_error)
    }
}

/// Non-empty string argument.
pub fn required_str<'a>(args: &'a Value, key: &str) -> ForgeResult<&'a str> {
    optional_str(args, key).ok_or_else(|| ForgeError::InvalidParams(format!("{} is required", key)))
}

/// String argument, treating blank values as absent.
pub fn optional_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
}

pub fn optional_bool(args: &Value, key: &str) -> ForgeResult<Option<bool>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(ForgeError::InvalidParams(format!("{} must be a boolean", key))),
    }
}
