//! Tool catalogue and dispatch for the three codesmith tools.

use serde_json::{json, Value};

use super::handlers::{commit, generate, review};
use crate::error::{ForgeError, ForgeResult};

pub use super::handlers::common::{ToolContext, ToolOutput};

pub const GENERATE_CODE: &str = "generate-code";
pub const CHECK_BEST_PRACTICES: &str = "check-best-practices";
pub const GITHUB_COMMIT: &str = "github-commit";

/// Dispatch a tool call by name.
pub async fn dispatch(name: &str, args: &Value, ctx: &ToolContext) -> ForgeResult<ToolOutput> {
    match name {
        GENERATE_CODE => generate::tool_generate_code(args, ctx).await,
        CHECK_BEST_PRACTICES => review::tool_check_best_practices(args, ctx).await,
        GITHUB_COMMIT => commit::tool_github_commit(args, ctx).await,
        _ => Err(ForgeError::MethodNotFound(name.to_string())),
    }
}

/// Run a tool and shape the MCP result. Operation failures become flagged
/// text; only bad calls (unknown tool, bad arguments) are protocol errors.
pub async fn call(name: &str, args: &Value, ctx: &ToolContext) -> ForgeResult<Value> {
    let start = std::time::Instant::now();
    let result = dispatch(name, args, ctx).await;
    tracing::info!(tool = name, elapsed_ms = start.elapsed().as_millis() as u64, ok = result.is_ok(), "tool call finished");

    match result {
        Ok(output) => Ok(output.into_content()),
        Err(e @ (ForgeError::InvalidParams(_) | ForgeError::MethodNotFound(_))) => Err(e),
        Err(e) => {
            tracing::error!("{} failed: {}", name, e);
            Ok(ToolOutput::failure(format!("Error: {}", e)).into_content())
        }
    }
}

/// The static tool list returned by `tools/list`.
pub fn tools_list() -> Vec<Value> {
    vec![
        json!({
            "name": GENERATE_CODE,
            "description": "Generate a complete project from a natural-language description. Creates the directory tree and every file under rootPath/<projectName> and returns the project bundle as JSON.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "description": { "type": "string", "description": "What the project should do" },
                    "language": { "type": "string", "description": "Programming language (default: javascript)", "default": "javascript" },
                    "framework": { "type": "string", "description": "Framework to build on (optional)" },
                    "rootPath": { "type": "string", "description": "Existing directory the project folder is created in" },
                    "includeTests": { "type": "boolean", "description": "Ask for test files as well", "default": false }
                },
                "required": ["description", "rootPath"]
            },
            "annotations": {
                "title": "Generate project",
                "readOnlyHint": false,
                "destructiveHint": false,
                "idempotentHint": false,
                "openWorldHint": true
            }
        }),
        json!({
            "name": CHECK_BEST_PRACTICES,
            "description": "Review a code snippet for best practices: strengths, issues with line numbers, recommendations and a score out of 10.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "code": { "type": "string", "description": "Source code to review" },
                    "language": { "type": "string", "description": "Language of the code" },
                    "framework": { "type": "string", "description": "Framework in use (optional)" },
                    "strictMode": { "type": "boolean", "description": "Also flag style and convention deviations", "default": false }
                },
                "required": ["code", "language"]
            },
            "annotations": {
                "title": "Check best practices",
                "readOnlyHint": true,
                "destructiveHint": false,
                "idempotentHint": true,
                "openWorldHint": false
            }
        }),
        json!({
            "name": GITHUB_COMMIT,
            "description": "Commit every file under a local directory (skipping .git, node_modules, build output, env files and lockfiles) as one commit on top of a GitHub branch, then advance the branch.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "localPath": { "type": "string", "description": "Local directory to snapshot" },
                    "repoName": { "type": "string", "description": "Repository name under the configured owner" },
                    "branchName": { "type": "string", "description": "Branch to commit on (must exist)" },
                    "message": { "type": "string", "description": "Commit message" }
                },
                "required": ["localPath", "repoName", "branchName", "message"]
            },
            "annotations": {
                "title": "Commit to GitHub",
                "readOnlyHint": false,
                "destructiveHint": false,
                "idempotentHint": false,
                "openWorldHint": true
            }
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::testing::FakeHost;
    use crate::llm::testing::ScriptedCompletion;
    use crate::mcp::handlers::common::testing::context;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_catalogue_names_and_required_fields() {
        let tools = tools_list();
        let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
        assert_eq!(names, vec![GENERATE_CODE, CHECK_BEST_PRACTICES, GITHUB_COMMIT]);
        assert_eq!(tools[1]["annotations"]["readOnlyHint"], true);
        assert_eq!(tools[2]["inputSchema"]["required"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_protocol_error() {
        let ctx = context(&Arc::new(ScriptedCompletion::replying("")), &Arc::new(FakeHost::new()));
        let err = call("deploy", &json!({}), &ctx).await.unwrap_err();
        assert!(matches!(err, ForgeError::MethodNotFound(_)));
    }

    #[tokio::test]
    async fn test_unparseable_generation_is_flagged_and_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let llm = Arc::new(ScriptedCompletion::replying("Sorry, I cannot help with that."));
        let ctx = context(&llm, &Arc::new(FakeHost::new()));

        let result = call(
            GENERATE_CODE,
            &json!({"description": "x", "rootPath": temp.path().to_str().unwrap()}),
            &ctx,
        )
        .await
        .unwrap();

        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"].as_str().unwrap().starts_with("Error: Parse error"));
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_bad_arguments_are_protocol_errors() {
        let ctx = context(&Arc::new(ScriptedCompletion::replying("")), &Arc::new(FakeHost::new()));
        let err = call(GITHUB_COMMIT, &json!({"repoName": "r"}), &ctx).await.unwrap_err();
        assert!(matches!(err, ForgeError::InvalidParams(_)));
    }
}
