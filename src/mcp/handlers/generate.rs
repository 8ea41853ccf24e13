use std::path::PathBuf;

use serde_json::Value;

use super::common::{optional_bool, optional_str, required_str, ToolContext, ToolOutput};
use crate::error::{ForgeError, ForgeResult};
use crate::project::{GenerateRequest, ProjectGenerator};

pub const DEFAULT_LANGUAGE: &str = "javascript";

pub fn parse_args(args: &Value) -> ForgeResult<GenerateRequest> {
    let description = required_str(args, "description")?;
    let root_path = optional_str(args, "rootPath")
        .or_else(|| optional_str(args, "rootpath"))
        .ok_or_else(|| ForgeError::InvalidParams("rootPath is required".into()))?;

    Ok(GenerateRequest {
        description: description.to_string(),
        language: optional_str(args, "language")
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_string(),
        framework: optional_str(args, "framework").map(String::from),
        root_path: PathBuf::from(root_path),
        include_tests: optional_bool(args, "includeTests")?,
    })
}

/// Generate a project on disk and return the bundle as pretty JSON.
pub async fn tool_generate_code(args: &Value, ctx: &ToolContext) -> ForgeResult<ToolOutput> {
    let req = parse_args(args)?;
    tracing::info!(
        "generate-code: language={} framework={:?} root={}",
        req.language,
        req.framework,
        req.root_path.display()
    );

    let result = ProjectGenerator::new(ctx.llm.as_ref(), &ctx.config.llm)
        .generate(&req)
        .await?;
    let text = serde_json::to_string_pretty(&result).map_err(|e| ForgeError::Parse(e.to_string()))?;
    Ok(ToolOutput::text(text))
}
