//! Create the directories and empty files a tree description names.

use std::path::Path;

use futures::future::BoxFuture;
use tokio::fs::OpenOptions;

use super::model::TreeNode;
use crate::error::ForgeResult;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MaterializeStats {
    pub directories: usize,
    pub files: usize,
}

/// Materialize each node in order under `base`.
pub async fn materialize_all(base: &Path, nodes: &[TreeNode]) -> ForgeResult<MaterializeStats> {
    let mut stats = MaterializeStats::default();
    for node in nodes {
        materialize(base, node, &mut stats).await?;
    }
    Ok(stats)
}

/// Ensure `node` exists under `base`. Existing directories are fine and existing
/// files keep their content. The first filesystem error aborts the walk.
pub fn materialize<'a>(
    base: &'a Path,
    node: &'a TreeNode,
    stats: &'a mut MaterializeStats,
) -> BoxFuture<'a, ForgeResult<()>> {
    Box::pin(async move {
        match node {
            TreeNode::Directory { name, children } => {
                let dir = base.join(name);
                tokio::fs::create_dir_all(&dir).await?;
                stats.directories += 1;
                for child in children {
                    materialize(&dir, child, stats).await?;
                }
            }
            TreeNode::File { name } => {
                let file = base.join(name);
                tokio::fs::create_dir_all(base).await?;
                // append + create: never truncates a file that is already there
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&file)
                    .await?;
                stats.files += 1;
            }
        }
        Ok(())
    })
}
