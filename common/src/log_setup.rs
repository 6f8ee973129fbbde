use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const MAX_LOG_FILES: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum LogSetupError {
    #[error("invalid log filter '{filter}': {source}")]
    Filter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("failed to create log directory '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create log file appender: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),
    #[error("logging is already initialized")]
    AlreadyInitialized,
}

/// Where and how the rolling log files are written.
#[derive(Debug, Clone)]
pub struct LogSettings {
    pub base_level: String,
    pub directory: PathBuf,
    pub file_prefix: String,
}

impl LogSettings {
    pub fn new(base_level: &str, directory: impl AsRef<Path>, file_prefix: &str) -> Self {
        Self {
            base_level: base_level.to_string(),
            directory: directory.as_ref().to_path_buf(),
            file_prefix: file_prefix.to_string(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self::new("info", "logs", "exod")
    }
}

/// Installs the global subscriber: `RUST_LOG` (or `base_level`) filtering,
/// console output with warnings and errors on stderr, and a daily rolling file.
pub fn setup_logging(base_level: &str) -> Result<(), LogSetupError> {
    setup_logging_with(&LogSettings {
        base_level: base_level.to_string(),
        ..LogSettings::default()
    })
}

pub fn setup_logging_with(settings: &LogSettings) -> Result<(), LogSetupError> {
    if LOG_GUARD.get().is_some() {
        return Err(LogSetupError::AlreadyInitialized);
    }

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            EnvFilter::try_new(&settings.base_level).map_err(|source| LogSetupError::Filter {
                filter: settings.base_level.clone(),
                source,
            })?
        }
    };

    std::fs::create_dir_all(&settings.directory).map_err(|source| LogSetupError::CreateDir {
        path: settings.directory.clone(),
        source,
    })?;

    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix(&settings.file_prefix)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(&settings.directory)?;

    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    LOG_GUARD
        .set(guard)
        .map_err(|_| LogSetupError::AlreadyInitialized)?;

    let console_writer = std::io::stdout.and(std::io::stderr.with_min_level(Level::WARN));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(true)
        .with_writer(console_writer);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_thread_names(true)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|_| LogSetupError::AlreadyInitialized)
}
