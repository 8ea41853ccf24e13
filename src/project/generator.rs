//! Project generation: one completion, one bundle, one directory on disk.

use std::path::PathBuf;

use super::extract::parse_bundle;
use super::materialize::materialize_all;
use super::model::{GenerationResult, GenerationSummary};
use super::writer::write_files;
use crate::config::LlmConfig;
use crate::error::ForgeResult;
use crate::llm::{CompletionClient, CompletionRequest, SamplingConfig};

pub const SYSTEM_INSTRUCTION: &str = "You are an expert software developer who creates complete, \
production-ready projects with clear documentation and setup instructions.";

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub description: String,
    pub language: String,
    pub framework: Option<String>,
    pub root_path: PathBuf,
    pub include_tests: Option<bool>,
}

pub fn build_prompt(req: &GenerateRequest) -> String {
    let framework = req
        .framework
        .as_deref()
        .map(|f| format!("Framework: {}\n", f))
        .unwrap_or_default();

    format!(
        r#"Generate a complete, production-ready project based on the following requirements:

Description: {description}
Language: {language}
{framework}
Please provide:
1. Complete file structure (directory tree)
2. All necessary files with complete code
3. Package configuration files (package.json, requirements.txt, etc.)
4. README.md with:
   - Project description
   - Installation instructions
   - Setup commands
   - How to run the project
   - How to run tests (if applicable)
   - Environment variables needed
5. Any additional configuration files needed

IMPORTANT: The fileStructure should represent the direct contents of the project directory, NOT wrapped in a root node.

Format your response as JSON with the following structure:
{{
  "projectName": "project-name",
  "fileStructure": [
    {{ "type": "file", "name": "README.md" }},
    {{
      "type": "directory",
      "name": "src",
      "children": [ {{ "type": "file", "name": "index.js" }} ]
    }}
  ],
  "files": [
    {{
      "path": "relative/path/to/file",
      "content": "file content here",
      "description": "brief description of this file"
    }}
  ],
  "setupInstructions": {{
    "prerequisites": ["prerequisite 1", "prerequisite 2"],
    "installCommands": ["command 1", "command 2"],
    "runCommands": ["command to run the project"],
    "testCommands": ["command to run tests"],
    "environmentVariables": [
      {{ "name": "VAR_NAME", "description": "what this variable is for", "example": "example value" }}
    ]
  }},
  "additionalNotes": "any additional information or tips"
}}"#,
        description = req.description,
        language = req.language,
        framework = framework,
    )
}

pub struct ProjectGenerator<'a> {
    llm: &'a dyn CompletionClient,
    config: &'a LlmConfig,
}

impl<'a> ProjectGenerator<'a> {
    pub fn new(llm: &'a dyn CompletionClient, config: &'a LlmConfig) -> Self {
        Self { llm, config }
    }

    /// Ask for a project, validate it fully, then write it under
    /// `root_path/projectName`. Nothing touches disk until the bundle is valid.
    pub async fn generate(&self, req: &GenerateRequest) -> ForgeResult<GenerationResult> {
        let request = CompletionRequest::new(&self.config.model, build_prompt(req))
            .with_system(SYSTEM_INSTRUCTION)
            .with_sampling(SamplingConfig::fixed(
                self.config.temperature,
                self.config.top_p,
                self.config.top_k,
            ));

        let text = self.llm.complete(request).await?;
        let bundle = parse_bundle(&text)?;
        bundle.validate()?;

        let summary = GenerationSummary {
            total_files: bundle.files.len(),
            language: req.language.clone(),
            framework: req.framework.clone(),
            has_tests: req.include_tests.unwrap_or(false),
        };

        let project_path = req.root_path.join(&bundle.project_name);
        tracing::info!("Generating project at: {}", project_path.display());
        tokio::fs::create_dir_all(&project_path).await?;

        let stats = materialize_all(&project_path, &bundle.file_structure).await?;
        let written = write_files(&project_path, &bundle.files).await?;
        tracing::info!(
            "Project generation completed: {} dirs, {} placeholders, {} files written",
            stats.directories,
            stats.files,
            written
        );

        Ok(GenerationResult {
            success: true,
            bundle,
            summary,
            project_path: project_path.to_string_lossy().to_string(),
        })
    }
}
