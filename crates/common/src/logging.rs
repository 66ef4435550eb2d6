use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::config::{LogConfig, LogFormat};

const DEFAULT_FILTER: &str = "homework_checker=info,homework_notifier=info,homework_common=info";

/// Initialize tracing with a stdout layer and an append-only log file layer.
pub fn init(config: &LogConfig) -> io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    let filter = config
        .filter
        .as_deref()
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

    let json = config.format == LogFormat::Json;
    let stdout_json = json.then(|| fmt::layer().json().with_writer(io::stdout));
    let stdout_text = (!json).then(|| fmt::layer().with_writer(io::stdout));
    let file_layer = fmt::layer().with_ansi(false).with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_json)
        .with(stdout_text)
        .with(file_layer)
        .init();

    Ok(())
}
