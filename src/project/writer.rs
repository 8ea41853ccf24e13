//! Write generated file contents into a project directory.

use std::path::{Path, PathBuf};

use super::model::{check_relative_path, GeneratedFile};
use crate::error::ForgeResult;

/// Absolute destination for a generated file, or an error if it escapes `root`.
pub fn resolve_inside(root: &Path, relative: &str) -> ForgeResult<PathBuf> {
    check_relative_path(relative)?;
    Ok(root.join(relative.replace('\\', "/")))
}

/// Write every file in order, creating parents and overwriting existing content.
/// Stops at the first failure; earlier writes stay on disk.
pub async fn write_files(project_path: &Path, files: &[GeneratedFile]) -> ForgeResult<usize> {
    let mut written = 0;
    for file in files {
        let full_path = resolve_inside(project_path, &file.path)?;
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full_path, file.content()).await?;
        written += 1;
        tracing::debug!("Wrote {}", full_path.display());
    }
    Ok(written)
}
