//! Source-hosting collaborator: the git data API (refs, commits, trees, blobs).

pub mod rest;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ForgeResult;

pub use rest::GithubClient;

/// Regular, non-executable file.
pub const FILE_MODE: &str = "100644";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ShaRef {
    pub sha: String,
}

/// A branch reference and the commit it points at.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub name: String,
    pub object: ShaRef,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitCommit {
    pub sha: String,
    pub tree: ShaRef,
    #[serde(default)]
    pub parents: Vec<ShaRef>,
    #[serde(default)]
    pub message: String,
}

/// One entry of a tree-creation request (a blob reference).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
}

impl TreeEntry {
    pub fn blob(path: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: FILE_MODE.to_string(),
            kind: "blob".to_string(),
            sha: sha.into(),
        }
    }
}

/// Git data operations, each scoped to `owner/repo`.
#[async_trait]
pub trait GitHost: Send + Sync {
    async fn get_branch_ref(&self, owner: &str, repo: &str, branch: &str) -> ForgeResult<GitRef>;

    async fn get_commit(&self, owner: &str, repo: &str, sha: &str) -> ForgeResult<GitCommit>;

    /// Upload base64-encoded content. Returns the blob sha.
    async fn create_blob(&self, owner: &str, repo: &str, content_base64: &str) -> ForgeResult<ShaRef>;

    /// Create a tree overlaying `entries` onto `base_tree`. Returns the tree sha.
    async fn create_tree(
        &self,
        owner: &str,
        repo: &str,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> ForgeResult<ShaRef>;

    async fn create_commit(
        &self,
        owner: &str,
        repo: &str,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> ForgeResult<GitCommit>;

    /// Fast-forward `branch` to `sha`. A non-fast-forward is `ForgeError::Conflict`.
    async fn update_ref(&self, owner: &str, repo: &str, branch: &str, sha: &str) -> ForgeResult<GitRef>;
}
