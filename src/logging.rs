//! Logging setup for the binary
//!
//! Console output goes to stderr. File output is optional: `--log <file>`
//! writes to that file, otherwise `logging.directory` from the config gets a
//! daily rolling `mount-notify.log`. `RUST_LOG` overrides the level chosen
//! from `-v`.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter directive for a `-v` count
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 | 1 => "mount_notify=info",
        2 => "mount_notify=debug",
        _ => "mount_notify=trace",
    }
}

/// Install the global subscriber. Keep the returned guard alive for the
/// lifetime of the process or buffered file output is lost.
pub fn init_logging(
    verbosity: u8,
    log_file: Option<&Path>,
    log_dir: Option<&Path>,
) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(verbosity)))
        .context("Invalid log filter")?;

    let appender = match (log_file, log_dir) {
        (Some(file), _) => {
            let dir = file.parent().unwrap_or_else(|| Path::new("."));
            let name = file
                .file_name()
                .context("Log file path has no file name")?;
            Some(rolling::never(dir, name))
        }
        (None, Some(dir)) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            Some(rolling::daily(dir, "mount-notify.log"))
        }
        (None, None) => None,
    };

    let (file_layer, guard) = match appender {
        Some(appender) => {
            let (writer, guard) = non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
