//! Log routing. stdout belongs to the protocol, so logs go to stderr, a file, or nowhere.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Where log records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    File(PathBuf),
    Quiet,
}

impl FromStr for LogSink {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "stderr" => Ok(Self::Stderr),
            "quiet" | "off" | "none" => Ok(Self::Quiet),
            other => match other.strip_prefix("file:") {
                Some(path) if !path.is_empty() => Ok(Self::File(PathBuf::from(path))),
                _ => Err(format!(
                    "unknown log sink '{}' (expected stderr, quiet or file:<path>)",
                    other
                )),
            },
        }
    }
}

impl LogSink {
    fn make_writer(&self) -> std::io::Result<Option<BoxMakeWriter>> {
        match self {
            Self::Stderr => Ok(Some(BoxMakeWriter::new(std::io::stderr))),
            Self::File(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Ok(Some(BoxMakeWriter::new(Mutex::new(file))))
            }
            Self::Quiet => Ok(None),
        }
    }
}

/// Install the global subscriber. JSON by default, text with `CODESMITH_LOG_TEXT=1`.
pub fn init(sink: &LogSink) -> anyhow::Result<()> {
    let Some(writer) = sink.make_writer()? else {
        return Ok(());
    };

    let text_logging = std::env::var("CODESMITH_LOG_TEXT")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "codesmith=info".into());

    if text_logging {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .try_init()?;
    }

    Ok(())
}
