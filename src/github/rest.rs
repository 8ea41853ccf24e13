//! GitHub REST implementation of [`GitHost`].

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretBox};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::{GitCommit, GitHost, GitRef, ShaRef, TreeEntry};
use crate::config::GithubConfig;
use crate::error::{ForgeError, ForgeResult, ServiceFailure};

const SERVICE: &str = "github";
const API_VERSION: &str = "2022-11-28";

pub struct GithubClient {
    token: Option<SecretBox<String>>,
    client: reqwest::Client,
    api_base: String,
}

impl GithubClient {
    pub fn new(token: Option<SecretBox<String>>, config: &GithubConfig) -> Self {
        Self {
            token,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .user_agent(concat!("codesmith/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    fn repo_url(&self, owner: &str, repo: &str, tail: &str) -> String {
        format!("{}/repos/{}/{}/git/{}", self.api_base, owner, repo, tail)
    }

    /// Attach auth headers, send, and decode the JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        op: &'static str,
        request: reqwest::RequestBuilder,
    ) -> ForgeResult<T> {
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| ForgeError::Config("GITHUB_TOKEN not set".into()))?;

        let response = request
            .bearer_auth(token.expose_secret())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| ForgeError::service(SERVICE, ServiceFailure::Unreachable, None, format!("{}: {}", op, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify(op, status.as_u16(), &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ForgeError::Parse(format!("{}: invalid response: {}", op, e)))
    }
}

/// Map a non-2xx status to the error taxonomy.
fn classify(op: &'static str, status: u16, body: &str) -> ForgeError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.trim().to_string());

    if op == "updateRef" && matches!(status, 409 | 422) {
        return ForgeError::Conflict(format!("branch moved since it was read: {}", message));
    }

    ForgeError::service(
        SERVICE,
        ServiceFailure::from_status(status),
        Some(status),
        format!("{} failed with {}: {}", op, status, message),
    )
}

#[async_trait]
impl GitHost for GithubClient {
    async fn get_branch_ref(&self, owner: &str, repo: &str, branch: &str) -> ForgeResult<GitRef> {
        let url = self.repo_url(owner, repo, &format!("ref/heads/{}", branch));
        self.send("getBranchRef", self.client.get(url)).await
    }

    async fn get_commit(&self, owner: &str, repo: &str, sha: &str) -> ForgeResult<GitCommit> {
        let url = self.repo_url(owner, repo, &format!("commits/{}", sha));
        self.send("getCommit", self.client.get(url)).await
    }

    async fn create_blob(&self, owner: &str, repo: &str, content_base64: &str) -> ForgeResult<ShaRef> {
        let url = self.repo_url(owner, repo, "blobs");
        let body = json!({ "content": content_base64, "encoding": "base64" });
        self.send("createBlob", self.client.post(url).json(&body)).await
    }

    async fn create_tree(
        &self,
        owner: &str,
        repo: &str,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> ForgeResult<ShaRef> {
        let url = self.repo_url(owner, repo, "trees");
        let body = json!({ "base_tree": base_tree, "tree": entries });
        self.send("createTree", self.client.post(url).json(&body)).await
    }

    async fn create_commit(
        &self,
        owner: &str,
        repo: &str,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> ForgeResult<GitCommit> {
        let url = self.repo_url(owner, repo, "commits");
        let body = json!({ "message": message, "tree": tree, "parents": parents });
        self.send("createCommit", self.client.post(url).json(&body)).await
    }

    async fn update_ref(&self, owner: &str, repo: &str, branch: &str, sha: &str) -> ForgeResult<GitRef> {
        let url = self.repo_url(owner, repo, &format!("refs/heads/{}", branch));
        let body = json!({ "sha": sha, "force": false });
        self.send("updateRef", self.client.patch(url).json(&body)).await
    }
}
