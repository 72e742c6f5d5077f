//! File logging setup.
//!
//! The log file is truncated on every start; lines carry a local timestamp,
//! the level and the message.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILE: &str = "logs/app.log";

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("failed to create log file {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to install log subscriber: {0}")]
    Install(String),
}

/// Install the global subscriber writing to `path`
pub fn init(path: &Path) -> Result<(), LoggingError> {
    let create_err = |source| LoggingError::Create {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(create_err)?;
    }
    let file = File::create(path).map_err(create_err)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .try_init()
        .map_err(|e| LoggingError::Install(e.to_string()))
}
