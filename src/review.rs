//! Best-practices review. Always answers with text, even when the service fails.

use crate::error::ForgeError;
use crate::llm::{CompletionClient, CompletionRequest};

#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub code: String,
    pub language: String,
    pub framework: Option<String>,
    pub strict_mode: bool,
}

/// Outcome of a review. `Failed` still carries user-facing text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    Analysis(String),
    Failed(String),
}

impl ReviewOutcome {
    pub fn text(&self) -> &str {
        match self {
            Self::Analysis(t) | Self::Failed(t) => t,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

pub fn build_prompt(req: &ReviewRequest) -> String {
    let framework = req
        .framework
        .as_deref()
        .map(|f| format!("Framework: {}", f))
        .unwrap_or_default();
    let strictness = if req.strict_mode {
        "\nStrict mode: also flag style, naming and convention deviations, however minor.\n"
    } else {
        ""
    };

    format!(
        r#"You are a code review expert. Analyze this {language} code for best practices.

{framework}
{strictness}
Code:
```{language}
{code}
```

Provide analysis with:

 **What's Good**
List positive things

 **Issues Found**
- Point out problems with line numbers
- Explain why each is an issue

 **Recommendations**
- How to fix each issue
- Better practices to follow

 **Score: X/10**
Give a score and brief reason

Keep it clear and helpful!"#,
        language = req.language,
        framework = framework,
        strictness = strictness,
        code = req.code,
    )
}

fn format_analysis(analysis: &str, model: &str) -> String {
    format!(
        "##  Best Practices Analysis\n\n{}\n\n---\n\n*Powered by {}*",
        analysis, model
    )
}

fn format_failure(err: &ForgeError) -> String {
    format!(
        "Error: {}\nWait 1 minute between requests or check your API key.",
        err
    )
}

/// Run one review with service-default sampling.
pub async fn review(llm: &dyn CompletionClient, model: &str, req: &ReviewRequest) -> ReviewOutcome {
    let request = CompletionRequest::new(model, build_prompt(req));

    match llm.complete(request).await {
        Ok(analysis) => ReviewOutcome::Analysis(format_analysis(&analysis, model)),
        Err(e) => {
            tracing::error!("Review completion failed: {}", e);
            ReviewOutcome::Failed(format_failure(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceFailure;
    use crate::llm::testing::ScriptedCompletion;

    fn request() -> ReviewRequest {
        ReviewRequest {
            code: "fn main() { let x = 1; }".into(),
            language: "rust".into(),
            framework: None,
            strict_mode: false,
        }
    }

    #[test]
    fn test_prompt_fences_code_with_language() {
        let prompt = build_prompt(&request());
        assert!(prompt.contains("```rust\nfn main() { let x = 1; }\n```"));
        assert!(prompt.contains("**Score: X/10**"));
        assert!(!prompt.contains("Framework:"));
        assert!(!prompt.contains("Strict mode"));

        let mut strict = request();
        strict.strict_mode = true;
        strict.framework = Some("axum".into());
        let prompt = build_prompt(&strict);
        assert!(prompt.contains("Framework: axum"));
        assert!(prompt.contains("Strict mode"));
    }

    #[tokio::test]
    async fn test_analysis_is_wrapped_verbatim() {
        let llm = ScriptedCompletion::replying("Looks fine. Score: 8/10");
        let outcome = review(&llm, "gemini-2.5-flash", &request()).await;

        assert!(!outcome.is_error());
        assert!(outcome.text().starts_with("##  Best Practices Analysis\n\nLooks fine. Score: 8/10"));
        assert!(outcome.text().ends_with("*Powered by gemini-2.5-flash*"));
        assert_eq!(llm.request_count(), 1);
        assert!(llm.last_request().sampling.is_default());
        assert!(llm.last_request().system_instruction.is_none());
    }

    #[tokio::test]
    async fn test_service_failure_becomes_text() {
        let llm = ScriptedCompletion::failing(ForgeError::service(
            "gemini",
            ServiceFailure::Rejected,
            Some(429),
            "quota exceeded",
        ));
        let outcome = review(&llm, "gemini-2.5-flash", &request()).await;

        assert!(outcome.is_error());
        assert!(outcome.text().starts_with("Error:"));
        assert!(outcome.text().contains("quota exceeded"));
        assert!(outcome.text().contains("Wait 1 minute"));
    }

    #[tokio::test]
    async fn test_missing_key_becomes_text() {
        let llm = ScriptedCompletion::failing(ForgeError::Config("GEMINI_API_KEY not set".into()));
        let outcome = review(&llm, "m", &request()).await;
        assert!(outcome.is_error());
        assert!(outcome.text().contains("GEMINI_API_KEY"));
    }
}
