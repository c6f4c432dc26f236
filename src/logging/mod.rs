pub mod config;

pub use config::{ConsoleOutput, LoggingSettings};

use crate::Result;
use anyhow::{anyhow, Context};
use std::fs::{create_dir_all, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;

static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Guards that keep logging sinks active for the duration of the command.
pub struct LoggingGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
    log_file_path: Option<PathBuf>,
}

impl LoggingGuard {
    /// Returns the log file path backed by the file sink, when enabled.
    pub fn log_file_path(&self) -> Option<&Path> {
        self.log_file_path.as_deref()
    }
}

/// Initialize the tracing framework from the resolved logging settings.
///
/// RUST_LOG takes precedence over the configured default level. Errors when
/// invoked more than once per process unless tests reset the guard.
pub fn init(settings: &LoggingSettings, workspace_root: &Path) -> Result<LoggingGuard> {
    if LOGGER_INITIALIZED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Err(anyhow!("logging already initialized"));
    }

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.default_level))
        .context("failed to configure tracing level")?;

    let console_layer = match settings.console_output {
        ConsoleOutput::None => None,
        output => {
            let writer = match output {
                ConsoleOutput::Stdout => BoxMakeWriter::new(io::stdout),
                _ => BoxMakeWriter::new(io::stderr),
            };
            Some(fmt_layer(writer))
        }
    };

    let (file_layer, file_guard, log_file_path) = if settings.enable_file {
        let path = log_file_path(settings, workspace_root);
        let directory = path
            .parent()
            .ok_or_else(|| anyhow!("log file path {} has no parent directory", path.display()))?;
        create_dir_all(directory)
            .with_context(|| format!("failed to create log directory {}", directory.display()))?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let writer = BoxMakeWriter::new(move || non_blocking.clone());
        (Some(fmt_layer(writer)), Some(guard), Some(path))
    } else {
        (None, None, None)
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .with(env_filter)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
        log_file_path,
    })
}

fn fmt_layer<S>(writer: BoxMakeWriter) -> tracing_subscriber::fmt::Layer<
    S,
    tracing_subscriber::fmt::format::DefaultFields,
    tracing_subscriber::fmt::format::Format,
    BoxMakeWriter,
>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
}

fn log_file_path(settings: &LoggingSettings, workspace_root: &Path) -> PathBuf {
    let directory = match &settings.log_dir {
        Some(custom) if custom.is_absolute() => custom.clone(),
        Some(custom) => workspace_root.join(custom),
        None => workspace_root.join(".lazarus").join("logs"),
    };
    directory.join("lazarus.log")
}

#[cfg(test)]
/// Reset the initialization guard so tests can reconfigure logging.
pub fn reset_for_tests() {
    LOGGER_INITIALIZED.store(false, Ordering::SeqCst);
}
