//! Project bundle data model and path-safety checks.

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ForgeError, ForgeResult};

/// One node of the requested directory layout. Only directories carry children.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    File {
        name: String,
    },
    Directory {
        name: String,
        #[serde(default)]
        children: Vec<TreeNode>,
    },
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            Self::File { name } | Self::Directory { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl GeneratedFile {
    pub fn content(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

/// Everything one generation response describes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBundle {
    pub project_name: String,
    #[serde(default)]
    pub file_structure: Vec<TreeNode>,
    pub files: Vec<GeneratedFile>,
    #[serde(default)]
    pub setup_instructions: Value,
    #[serde(default)]
    pub additional_notes: Value,
}

impl ProjectBundle {
    /// Reject names and paths that would land outside the project root.
    pub fn validate(&self) -> ForgeResult<()> {
        check_segment(&self.project_name, "projectName")?;
        for node in &self.file_structure {
            check_node(node)?;
        }
        for file in &self.files {
            check_relative_path(&file.path)?;
        }
        Ok(())
    }
}

fn check_node(node: &TreeNode) -> ForgeResult<()> {
    check_segment(node.name(), "fileStructure node name")?;
    if let TreeNode::Directory { children, .. } = node {
        for child in children {
            check_node(child)?;
        }
    }
    Ok(())
}

/// A single path segment: non-empty, no separators, not `.` or `..`.
pub fn check_segment(name: &str, what: &str) -> ForgeResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(ForgeError::Parse(format!("invalid {}: {:?}", what, name)));
    }
    Ok(())
}

/// A relative, slash-separated path that stays inside its root.
pub fn check_relative_path(path: &str) -> ForgeResult<()> {
    let normalized = path.replace('\\', "/");
    if normalized.trim().is_empty() {
        return Err(ForgeError::Parse("empty file path".into()));
    }

    let mut has_normal = false;
    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(_) => has_normal = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ForgeError::Parse(format!(
                    "file path escapes the project root: {:?}",
                    path
                )));
            }
        }
    }

    if !has_normal {
        return Err(ForgeError::Parse(format!("file path names no file: {:?}", path)));
    }
    Ok(())
}

/// Derived facts about a generated project.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummary {
    pub total_files: usize,
    pub language: String,
    pub framework: Option<String>,
    pub has_tests: bool,
}

/// What `generate-code` returns.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub success: bool,
    #[serde(flatten)]
    pub bundle: ProjectBundle,
    pub summary: GenerationSummary,
    pub project_path: String,
}
