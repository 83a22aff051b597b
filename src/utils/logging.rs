use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub fn level_from_cli(cli: &crate::cli::args::Cli) -> Level {
    if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    }
}

/// The log file records at least `INFO` whatever the console level is.
fn file_level(level: Level) -> LevelFilter {
    match level {
        Level::TRACE | Level::DEBUG => LevelFilter::from_level(level),
        _ => LevelFilter::INFO,
    }
}

pub fn init(level: Level, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("reconguard={}", level).parse()?)
        .add_directive(level.into());

    let console = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .with_filter(filter);

    let (handle, open_error) = match log_file.map(open_log_file).transpose() {
        Ok(handle) => (handle, None),
        Err(e) => (None, Some(e)),
    };
    let file = handle.map(|handle| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(handle))
            .with_filter(file_level(level))
    });

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    // An unwritable log file only costs the file copy of the logs
    if let Some(e) = open_error {
        tracing::warn!("{:#}; logging to the console only", e);
    }

    Ok(())
}

fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}
