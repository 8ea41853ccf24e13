use serde_json::Value;

use super::common::{optional_bool, optional_str, required_str, ToolContext, ToolOutput};
use crate::error::ForgeResult;
use crate::review::{review, ReviewRequest};

pub fn parse_args(args: &Value) -> ForgeResult<ReviewRequest> {
    Ok(ReviewRequest {
        code: required_str(args, "code")?.to_string(),
        language: required_str(args, "language")?.to_string(),
        framework: optional_str(args, "framework").map(String::from),
        strict_mode: optional_bool(args, "strictMode")?.unwrap_or(false),
    })
}

/// Review failures come back as flagged text, never as a call error.
pub async fn tool_check_best_practices(args: &Value, ctx: &ToolContext) -> ForgeResult<ToolOutput> {
    let req = parse_args(args)?;
    let outcome = review(ctx.llm.as_ref(), &ctx.config.llm.model, &req).await;
    let is_error = outcome.is_error();
    let text = outcome.text().to_string();
    Ok(if is_error {
        ToolOutput::failure(text)
    } else {
        ToolOutput::text(text)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ForgeError, ServiceFailure};
    use crate::github::testing::FakeHost;
    use crate::llm::testing::ScriptedCompletion;
    use crate::mcp::handlers::common::testing::context;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_review_passes_analysis_through() {
        let llm = Arc::new(ScriptedCompletion::replying("Solid. Score: 9/10"));
        let ctx = context(&llm, &Arc::new(FakeHost::new()));
        let out = tool_check_best_practices(
            &json!({"code": "let a = 1;", "language": "javascript", "strictMode": true}),
            &ctx,
        )
        .await
        .unwrap();

        assert!(!out.is_error);
        assert!(out.text.contains("Solid. Score: 9/10"));
        assert!(llm.last_request().prompt.contains("Strict mode"));
    }

    #[tokio::test]
    async fn test_review_failure_is_flagged_text() {
        let llm = Arc::new(ScriptedCompletion::failing(ForgeError::service(
            "gemini",
            ServiceFailure::Unreachable,
            None,
            "connection reset",
        )));
        let ctx = context(&llm, &Arc::new(FakeHost::new()));
        let out = tool_check_best_practices(&json!({"code": "x", "language": "go"}), &ctx)
            .await
            .unwrap();
        assert!(out.is_error);
        assert!(out.text.starts_with("Error:"));
    }

    #[test]
    fn test_code_and_language_required() {
        assert!(parse_args(&json!({"language": "go"})).is_err());
        assert!(parse_args(&json!({"code": "x"})).is_err());
    }
}
