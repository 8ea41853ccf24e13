//! Push a local directory as one commit on top of a remote branch.

use std::path::PathBuf;

use base64::Engine;
use futures::{stream, StreamExt, TryStreamExt};
use serde::Serialize;

use super::enumerate::{enumerate_files, IgnoreSet, LocalFile};
use crate::error::{ForgeError, ForgeResult};
use crate::github::{GitHost, TreeEntry};

#[derive(Debug, Clone)]
pub struct CommitRequest {
    pub local_path: PathBuf,
    pub repo_name: String,
    pub branch_name: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReport {
    pub success: bool,
    pub sha: String,
    pub message: String,
    pub url: String,
    pub files_committed: usize,
}

pub struct SnapshotCommitter<'a> {
    pub host: &'a dyn GitHost,
    pub owner: &'a str,
    pub web_base: &'a str,
    pub ignore: &'a IgnoreSet,
    /// Blob uploads in flight at once.
    pub upload_concurrency: usize,
}

impl<'a> SnapshotCommitter<'a> {
    pub async fn commit_and_push(&self, req: &CommitRequest) -> ForgeResult<CommitReport> {
        let owner = self.owner;
        let repo = req.repo_name.as_str();
        let branch = req.branch_name.as_str();

        if owner.trim().is_empty() {
            return Err(ForgeError::Config(
                "repository owner not configured (set github.owner or GITHUB_OWNER)".into(),
            ));
        }

        tracing::info!("Repository: {}/{}", owner, repo);
        tracing::info!("Local path: {}", req.local_path.display());

        if !tokio::fs::try_exists(&req.local_path).await.unwrap_or(false) {
            return Err(ForgeError::NotFound(req.local_path.display().to_string()));
        }
        if !req.local_path.is_dir() {
            return Err(ForgeError::InvalidParams(format!(
                "not a directory: {}",
                req.local_path.display()
            )));
        }

        let root = req.local_path.clone();
        let ignore = self.ignore.clone();
        let files = tokio::task::spawn_blocking(move || enumerate_files(&root, &ignore))
            .await
            .map_err(|e| ForgeError::Io(std::io::Error::other(e)))??;
        tracing::info!("Found {} files", files.len());

        if files.is_empty() {
            return Err(ForgeError::EmptyTree(req.local_path.display().to_string()));
        }

        let head = host_step(self.host.get_branch_ref(owner, repo, branch).await)?;
        let head_sha = head.object.sha;
        let head_commit = host_step(self.host.get_commit(owner, repo, &head_sha).await)?;
        let base_tree_sha = head_commit.tree.sha;

        tracing::info!("Uploading {} files...", files.len());
        let entries = self.upload_all(owner, repo, &files).await?;

        let tree = host_step(
            self.host
                .create_tree(owner, repo, &base_tree_sha, &entries)
                .await,
        )?;

        let commit = host_step(
            self.host
                .create_commit(owner, repo, &req.message, &tree.sha, &[head_sha.clone()])
                .await,
        )?;

        host_step(self.host.update_ref(owner, repo, branch, &commit.sha).await)?;

        let url = format!(
            "{}/{}/{}/commit/{}",
            self.web_base.trim_end_matches('/'),
            owner,
            repo,
            commit.sha
        );
        tracing::info!("Committed and pushed {} ({} files): {}", commit.sha, files.len(), url);

        Ok(CommitReport {
            success: true,
            sha: commit.sha,
            message: req.message.clone(),
            url,
            files_committed: files.len(),
        })
    }

    /// Upload every file as a blob. Uploads may overlap; the returned
    /// entries follow `files` order.
    async fn upload_all(&self, owner: &str, repo: &str, files: &[LocalFile]) -> ForgeResult<Vec<TreeEntry>> {
        let total = files.len();
        stream::iter(files)
            .map(|file| self.upload(owner, repo, file))
            .buffered(self.upload_concurrency.max(1))
            .enumerate()
            .map(|(i, result)| {
                if result.is_ok() && ((i + 1) % 10 == 0 || i + 1 == total) {
                    tracing::info!("  Uploaded {}/{} files", i + 1, total);
                }
                result
            })
            .try_collect()
            .await
    }

    async fn upload(&self, owner: &str, repo: &str, file: &LocalFile) -> ForgeResult<TreeEntry> {
        let bytes = tokio::fs::read(&file.absolute_path).await?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        let blob = host_step(self.host.create_blob(owner, repo, &encoded).await)?;
        Ok(TreeEntry::blob(file.relative_path.clone(), blob.sha))
    }
}

/// Log operator hints for remote failures, then pass the result through.
fn host_step<T>(result: ForgeResult<T>) -> ForgeResult<T> {
    if let Err(e) = &result {
        tracing::error!("Error: {}", e);
        if let Some(hint) = e.service_failure().and_then(|f| f.hint()) {
            tracing::error!("{}", hint);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_ignore;
    use crate::error::ServiceFailure;
    use crate::github::testing::{blob_sha, Call, FakeHost};
    use std::path::Path;
    use tempfile::TempDir;

    fn b64(s: &str) -> String {
        base64::engine::general_purpose::STANDARD.encode(s)
    }

    fn touch(root: &Path, rel: &str, content: &str) {
        let p = root.join(rel);
        std::fs::create_dir_all(p.parent().unwrap()).unwrap();
        std::fs::write(p, content).unwrap();
    }

    fn request(path: &Path) -> CommitRequest {
        CommitRequest {
            local_path: path.to_path_buf(),
            repo_name: "demo".into(),
            branch_name: "main".into(),
            message: "snapshot".into(),
        }
    }

    async fn run(host: &FakeHost, req: &CommitRequest, concurrency: usize) -> ForgeResult<CommitReport> {
        let ignore = IgnoreSet::new(default_ignore());
        SnapshotCommitter {
            host,
            owner: "octo",
            web_base: "https://github.com/",
            ignore: &ignore,
            upload_concurrency: concurrency,
        }
        .commit_and_push(req)
        .await
    }

    #[tokio::test]
    async fn test_commit_chain_with_ignored_file() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "index.js", "console.log(1)");
        touch(temp.path(), "lib/util.js", "exports.x = 1");
        touch(temp.path(), ".env", "SECRET=1");

        let host = FakeHost::new();
        let report = run(&host, &request(temp.path()), 1).await.unwrap();

        assert_eq!(host.blob_uploads().len(), 2);
        assert_eq!(report.files_committed, 2);
        assert_eq!(report.sha, "newcommit");
        assert_eq!(report.url, "https://github.com/octo/demo/commit/newcommit");

        let calls = host.calls();
        assert_eq!(calls[0], Call::GetRef("main".into()));
        assert_eq!(calls[1], Call::GetCommit("head000".into()));
        assert!(calls.contains(&Call::CreateTree {
            base_tree: "tree000".into(),
            entries: vec![
                TreeEntry::blob("index.js", blob_sha(&b64("console.log(1)"))),
                TreeEntry::blob("lib/util.js", blob_sha(&b64("exports.x = 1"))),
            ],
        }));
        assert!(calls.contains(&Call::CreateCommit {
            message: "snapshot".into(),
            tree: "newtree".into(),
            parents: vec!["head000".into()],
        }));
        assert_eq!(
            calls.last().unwrap(),
            &Call::UpdateRef { branch: "main".into(), sha: "newcommit".into() }
        );
        assert!(host.owners.lock().unwrap().iter().all(|o| o == "octo"));
    }

    #[tokio::test]
    async fn test_parallel_uploads_keep_enumeration_order() {
        let temp = TempDir::new().unwrap();
        for name in ["a", "b", "c", "d", "e", "f"] {
            touch(temp.path(), &format!("{}.txt", name), name);
        }

        let mut host = FakeHost::new();
        host.stagger_blobs = true;
        run(&host, &request(temp.path()), 4).await.unwrap();

        let tree_entries = host
            .calls()
            .into_iter()
            .find_map(|c| match c {
                Call::CreateTree { entries, .. } => Some(entries),
                _ => None,
            })
            .unwrap();
        let paths: Vec<&str> = tree_entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["a.txt", "b.txt", "c.txt", "d.txt", "e.txt", "f.txt"]);
        assert_eq!(tree_entries[0].sha, blob_sha(&b64("a")));
    }

    #[tokio::test]
    async fn test_missing_branch_uploads_nothing() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "index.js", "x");

        let mut host = FakeHost::new();
        host.missing_branch = true;
        let err = run(&host, &request(temp.path()), 1).await.unwrap_err();

        assert_eq!(err.service_failure(), Some(ServiceFailure::NotFound));
        assert!(host.blob_uploads().is_empty());
        assert_eq!(host.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_branch_moved_is_conflict() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "index.js", "x");

        let mut host = FakeHost::new();
        host.branch_moved = true;
        let err = run(&host, &request(temp.path()), 1).await.unwrap_err();
        assert!(matches!(err, ForgeError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_missing_path_and_empty_tree() {
        let temp = TempDir::new().unwrap();
        let host = FakeHost::new();

        let err = run(&host, &request(&temp.path().join("nope")), 1).await.unwrap_err();
        assert!(matches!(err, ForgeError::NotFound(_)));

        touch(temp.path(), "node_modules/dep/index.js", "x");
        touch(temp.path(), "package-lock.json", "{}");
        let err = run(&host, &request(temp.path()), 1).await.unwrap_err();
        assert!(matches!(err, ForgeError::EmptyTree(_)));

        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unset_owner_is_config_error() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "index.js", "x");
        let host = FakeHost::new();
        let ignore = IgnoreSet::default();
        let err = SnapshotCommitter {
            host: &host,
            owner: "",
            web_base: "https://github.com",
            ignore: &ignore,
            upload_concurrency: 1,
        }
        .commit_and_push(&request(temp.path()))
        .await
        .unwrap_err();
        assert!(matches!(err, ForgeError::Config(_)));
        assert!(host.calls().is_empty());
    }
}
