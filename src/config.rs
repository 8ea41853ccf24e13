//! codesmith configuration: `config.toml` plus credentials from the environment.

use std::collections::BTreeSet;
use std::env;
use std::path::{Path, PathBuf};

use secrecy::SecretBox;
use serde::{Deserialize, Serialize};

/// codesmith configuration from config.toml
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct ForgeConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub commit: CommitConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_llm_api_base")]
    pub api_base: String,
    /// Sampling used by project generation. Review uses service defaults.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_llm_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_top_p() -> f32 {
    0.95
}
fn default_top_k() -> u32 {
    40
}
fn default_llm_timeout() -> u64 {
    300
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base: default_llm_api_base(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GithubConfig {
    /// Repository owner every commit is pushed under.
    #[serde(default)]
    pub owner: String,
    #[serde(default = "default_github_api_base")]
    pub api_base: String,
    #[serde(default = "default_github_web_base")]
    pub web_base: String,
    /// Blob uploads in flight at once (1 = strictly sequential).
    #[serde(default = "default_upload_concurrency")]
    pub upload_concurrency: usize,
    #[serde(default = "default_github_timeout")]
    pub timeout_secs: u64,
}

fn default_github_api_base() -> String {
    "https://api.github.com".to_string()
}
fn default_github_web_base() -> String {
    "https://github.com".to_string()
}
fn default_upload_concurrency() -> usize {
    4
}
fn default_github_timeout() -> u64 {
    60
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            api_base: default_github_api_base(),
            web_base: default_github_web_base(),
            upload_concurrency: default_upload_concurrency(),
            timeout_secs: default_github_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CommitConfig {
    /// File and directory names skipped at any depth when snapshotting.
    #[serde(default = "default_ignore")]
    pub ignore: BTreeSet<String>,
}

pub fn default_ignore() -> BTreeSet<String> {
    [
        ".git",
        "node_modules",
        ".DS_Store",
        "dist",
        "build",
        ".env",
        ".env.local",
        "package-lock.json",
        "yarn.lock",
        "pnpm-lock.yaml",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            ignore: default_ignore(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// `stderr`, `quiet` or `file:<path>`
    #[serde(default = "default_sink")]
    pub sink: String,
}

fn default_sink() -> String {
    "stderr".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            sink: default_sink(),
        }
    }
}

/// `~/.codesmith`
pub fn codesmith_home() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".codesmith"))
}

pub fn default_config_path() -> Option<PathBuf> {
    codesmith_home().map(|h| h.join("config.toml"))
}

/// Load config from `path`. A missing or unreadable file yields defaults.
pub fn load_config(path: &Path) -> ForgeConfig {
    if !path.exists() {
        return ForgeConfig::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse {}: {}", path.display(), e);
            ForgeConfig::default()
        }),
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            ForgeConfig::default()
        }
    }
}

/// Out-of-band secrets. Absence is only an error once an operation needs one.
pub struct Credentials {
    pub llm_api_key: Option<SecretBox<String>>,
    pub github_token: Option<SecretBox<String>>,
}

impl Credentials {
    /// Read credentials from the process environment. `.env` is loaded by `main`.
    pub fn from_env() -> Self {
        let secret = |name: &str| {
            env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(|v| SecretBox::new(Box::new(v)))
        };
        Self {
            llm_api_key: secret("GEMINI_API_KEY").or_else(|| secret("GOOGLE_API_KEY")),
            github_token: secret("GITHUB_TOKEN"),
        }
    }
}

/// Apply environment overrides that are not secrets.
pub fn apply_env_overrides(config: &mut ForgeConfig) {
    apply_overrides(config, |name| env::var(name).ok());
}

fn apply_overrides(config: &mut ForgeConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(owner) = lookup("GITHUB_OWNER") {
        if !owner.trim().is_empty() {
            config.github.owner = owner.trim().to_string();
        }
    }
}

pub const DEFAULT_CONFIG: &str = r#"# codesmith configuration
# See: codesmith config --help

[llm]
model = "gemini-2.5-flash"
api_base = "https://generativelanguage.googleapis.com/v1beta"
temperature = 0.7
top_p = 0.95
top_k = 40
timeout_secs = 300

[github]
owner = ""
api_base = "https://api.github.com"
web_base = "https://github.com"
upload_concurrency = 4
timeout_secs = 60

[commit]
ignore = [".git", "node_modules", ".DS_Store", "dist", "build", ".env", ".env.local", "package-lock.json", "yarn.lock", "pnpm-lock.yaml"]

[logging]
sink = "stderr"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(&temp.path().join("nope.toml"));
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.llm.top_k, 40);
        assert_eq!(config.github.upload_concurrency, 4);
        assert!(config.commit.ignore.contains("node_modules"));
        assert_eq!(config.commit.ignore.len(), 10);
    }

    #[test]
    fn test_default_config_text_matches_defaults() {
        let parsed: ForgeConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed.commit.ignore, default_ignore());
        assert_eq!(parsed.llm.temperature, default_temperature());
        assert_eq!(parsed.github.api_base, default_github_api_base());
        assert_eq!(parsed.logging.sink, "stderr");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[github]\nowner = \"octo\"\n").unwrap();
        let config = load_config(&path);
        assert_eq!(config.github.owner, "octo");
        assert_eq!(config.github.web_base, "https://github.com");
        assert_eq!(config.llm.top_p, 0.95);
    }

    #[test]
    fn test_broken_file_falls_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[llm\nmodel = ").unwrap();
        let config = load_config(&path);
        assert_eq!(config.llm.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_owner_override() {
        let mut config = ForgeConfig::default();
        config.github.owner = "from-file".into();

        apply_overrides(&mut config, |_| None);
        assert_eq!(config.github.owner, "from-file");

        apply_overrides(&mut config, |_| Some("   ".into()));
        assert_eq!(config.github.owner, "from-file");

        apply_overrides(&mut config, |name| (name == "GITHUB_OWNER").then(|| " octo ".into()));
        assert_eq!(config.github.owner, "octo");
    }

    #[test]
    fn test_dotenv_owner_reaches_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".env");
        std::fs::write(&path, "GITHUB_OWNER=dotenv-octo\nGITHUB_TOKEN=t\n").unwrap();

        let vars: std::collections::HashMap<String, String> = dotenvy::from_path_iter(&path)
            .unwrap()
            .map(|item| item.unwrap())
            .collect();
        let mut config = ForgeConfig::default();
        apply_overrides(&mut config, |name| vars.get(name).cloned());
        assert_eq!(config.github.owner, "dotenv-octo");
    }
}
