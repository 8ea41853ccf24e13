mod config;
mod error;
mod github;
mod ipc;
mod llm;
mod logging;
mod mcp;
mod project;
mod review;
mod snapshot;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use config::{Credentials, ForgeConfig};
use logging::LogSink;
use mcp::tools::{self, ToolContext};

#[derive(Parser)]
#[command(name = "codesmith")]
#[command(about = "MCP tool server: LLM project generation, code review and GitHub snapshot commits", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: ~/.codesmith/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log sink: stderr, quiet or file:<path>
    #[arg(long, global = true)]
    log: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server on stdio (default)
    Serve,

    /// Generate a project from a description
    Generate {
        /// What the project should do
        description: String,
        /// Directory the project folder is created in
        #[arg(long, default_value = ".")]
        root: PathBuf,
        #[arg(short, long, default_value = "javascript")]
        language: String,
        #[arg(short, long)]
        framework: Option<String>,
        /// Ask for test files as well
        #[arg(long)]
        tests: bool,
    },

    /// Review a source file for best practices
    Review {
        /// File to review
        file: PathBuf,
        #[arg(short, long)]
        language: String,
        #[arg(short, long)]
        framework: Option<String>,
        /// Also flag style and convention deviations
        #[arg(long)]
        strict: bool,
    },

    /// Commit a local directory to a GitHub branch
    Commit {
        /// Local directory to snapshot
        path: PathBuf,
        #[arg(long)]
        repo: String,
        #[arg(long, default_value = "main")]
        branch: String,
        #[arg(short, long)]
        message: String,
    },

    /// Print the tool catalogue as JSON
    Tools,

    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Create default config.toml in ~/.codesmith/
    Init,
    /// Show path to the config file
    Path,
}

fn main() -> anyhow::Result<()> {
    // Before anything reads the environment: owner override, log filter, credentials.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config_path = match cli.config.clone().or_else(config::default_config_path) {
        Some(p) => p,
        None => anyhow::bail!("Cannot determine home directory; pass --config"),
    };

    let mut config = config::load_config(&config_path);
    config::apply_env_overrides(&mut config);

    let sink: LogSink = cli
        .log
        .as_deref()
        .unwrap_or(config.logging.sink.as_str())
        .parse()
        .map_err(anyhow::Error::msg)?;
    logging::init(&sink)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => handle_serve(config),
        Commands::Generate {
            description,
            root,
            language,
            framework,
            tests,
        } => run_tool(
            config,
            tools::GENERATE_CODE,
            json!({
                "description": description,
                "rootPath": root.to_string_lossy(),
                "language": language,
                "framework": framework,
                "includeTests": tests,
            }),
        ),
        Commands::Review {
            file,
            language,
            framework,
            strict,
        } => {
            let code = std::fs::read_to_string(&file)?;
            run_tool(
                config,
                tools::CHECK_BEST_PRACTICES,
                json!({
                    "code": code,
                    "language": language,
                    "framework": framework,
                    "strictMode": strict,
                }),
            )
        }
        Commands::Commit {
            path,
            repo,
            branch,
            message,
        } => run_tool(
            config,
            tools::GITHUB_COMMIT,
            json!({
                "localPath": path.to_string_lossy(),
                "repoName": repo,
                "branchName": branch,
                "message": message,
            }),
        ),
        Commands::Tools => {
            println!("{}", serde_json::to_string_pretty(&tools::tools_list())?);
            Ok(())
        }
        Commands::Config { action } => handle_config(action, &config_path, &config),
    }
}

/// Wire the real collaborators from config and environment.
fn build_context(config: ForgeConfig) -> ToolContext {
    let creds = Credentials::from_env();
    let llm = llm::GeminiClient::new(creds.llm_api_key, &config.llm);
    let git = github::GithubClient::new(creds.github_token, &config.github);
    ToolContext {
        llm: Arc::new(llm),
        git: Arc::new(git),
        config: Arc::new(config),
    }
}

fn handle_serve(config: ForgeConfig) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        let ctx = build_context(config);
        let token = CancellationToken::new();

        let signal_token = token.clone();
        tokio::spawn(async move {
            if let Err(e) = wait_for_shutdown_signal().await {
                tracing::error!("Failed to register signal handlers: {}", e);
                return;
            }
            signal_token.cancel();
        });

        ipc::server::run_stdio(ctx, token).await
    })
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => tracing::info!("SIGTERM received, shutting down"),
        _ = sigint.recv() => tracing::info!("SIGINT received, shutting down"),
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("Ctrl-C received, shutting down");
    Ok(())
}

/// Run one tool outside the server and print its text result.
fn run_tool(config: ForgeConfig, name: &str, args: Value) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(async {
        let ctx = build_context(config);
        tools::call(name, &args, &ctx).await
    })?;

    let text = result["content"][0]["text"].as_str().unwrap_or_default();
    println!("{}", text);

    if result.get("isError").and_then(|v| v.as_bool()).unwrap_or(false) {
        anyhow::bail!("{} failed", name);
    }
    Ok(())
}

fn handle_config(action: Option<ConfigAction>, path: &Path, config: &ForgeConfig) -> anyhow::Result<()> {
    match action {
        Some(ConfigAction::Path) => {
            println!("{}", path.display());
        }
        Some(ConfigAction::Init) => {
            if path.exists() {
                eprintln!("Config already exists: {}", path.display());
                return Ok(());
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, config::DEFAULT_CONFIG)?;
            println!("Created: {}", path.display());
        }
        None => {
            println!("# Effective config ({})\n", path.display());
            println!("{}", toml::to_string_pretty(config)?);
        }
    }

    Ok(())
}
