//! Local tree enumeration with a name-based ignore set.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::ForgeResult;

/// Names excluded at any depth (files and whole directories alike).
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    names: BTreeSet<String>,
}

impl IgnoreSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub absolute_path: PathBuf,
    /// Relative to the enumeration root, always `/`-separated.
    pub relative_path: String,
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Every regular file under `root`, sorted by path, skipping ignored names.
pub fn enumerate_files(root: &Path, ignore: &IgnoreSet) -> ForgeResult<Vec<LocalFile>> {
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !ignore.contains(&e.file_name().to_string_lossy()));

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        files.push(LocalFile {
            absolute_path: entry.path().to_path_buf(),
            relative_path: to_slash(relative),
        });
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_ignore;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let p = root.join(rel);
        std::fs::create_dir_all(p.parent().unwrap()).unwrap();
        std::fs::write(p, rel).unwrap();
    }

    #[test]
    fn test_skips_ignored_names_at_any_depth() {
        let temp = TempDir::new().unwrap();
        for rel in [
            "README.md",
            "src/app.js",
            "src/.env",
            "node_modules/left-pad/index.js",
            "packages/web/node_modules/x.js",
            "packages/web/dist/bundle.js",
            ".git/HEAD",
            "yarn.lock",
            "docs/build.md",
        ] {
            touch(temp.path(), rel);
        }

        let files = enumerate_files(temp.path(), &IgnoreSet::new(default_ignore())).unwrap();
        let rels: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(rels, vec!["README.md", "docs/build.md", "src/app.js"]);
        assert!(files[2].absolute_path.ends_with("src/app.js"));
    }

    #[test]
    fn test_empty_root_yields_nothing() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("only-dirs")).unwrap();
        let files = enumerate_files(temp.path(), &IgnoreSet::default()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_ignore_root_name_is_not_applied_to_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("build");
        touch(&root, "a.txt");
        let files = enumerate_files(&root, &IgnoreSet::new(["build"])).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative_path, "a.txt");
    }
}
