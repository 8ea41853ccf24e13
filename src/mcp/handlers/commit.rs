use std::path::PathBuf;

use serde_json::Value;

use super::common::{required_str, ToolContext, ToolOutput};
use crate::error::{ForgeError, ForgeResult};
use crate::snapshot::{CommitRequest, IgnoreSet, SnapshotCommitter};

pub fn parse_args(args: &Value) -> ForgeResult<CommitRequest> {
    Ok(CommitRequest {
        local_path: PathBuf::from(required_str(args, "localPath")?),
        repo_name: required_str(args, "repoName")?.to_string(),
        branch_name: required_str(args, "branchName")?.to_string(),
        message: required_str(args, "message")?.to_string(),
    })
}

/// Failure payload, with an operator hint for auth and not-found failures.
pub fn failure_text(err: &ForgeError) -> String {
    let mut text = format!("Failed to create GitHub commit: {}", err);
    if let Some(hint) = err.service_failure().and_then(|f| f.hint()) {
        text.push_str(&format!("\nHint: {}", hint));
    }
    text
}

pub async fn tool_github_commit(args: &Value, ctx: &ToolContext) -> ForgeResult<ToolOutput> {
    let req = parse_args(args)?;
    let github = &ctx.config.github;
    let ignore = IgnoreSet::new(ctx.config.commit.ignore.iter().cloned());

    let committer = SnapshotCommitter {
        host: ctx.git.as_ref(),
        owner: &github.owner,
        web_base: &github.web_base,
        ignore: &ignore,
        upload_concurrency: github.upload_concurrency,
    };

    match committer.commit_and_push(&req).await {
        Ok(report) => {
            let text = serde_json::to_string_pretty(&report)
                .map_err(|e| ForgeError::Parse(e.to_string()))?;
            Ok(ToolOutput::text(text))
        }
        Err(e @ ForgeError::InvalidParams(_)) => Err(e),
        Err(e) => Ok(ToolOutput::failure(failure_text(&e))),
    }
}
