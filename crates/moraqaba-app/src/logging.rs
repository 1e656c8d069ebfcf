#![forbid(unsafe_code)]

//! Log setup.
//!
//! The terminal belongs to the UI, so logs go to a file. `MORAQABA_LOG` takes
//! an `EnvFilter` directive (default `info`).

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const FILTER_ENV: &str = "MORAQABA_LOG";
const DEFAULT_FILTER: &str = "info";

#[derive(Debug)]
pub enum LogSetupError {
    Open(io::Error),
    Filter(String),
    AlreadySet,
}

impl fmt::Display for LogSetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSetupError::Open(e) => write!(f, "cannot open log file: {e}"),
            LogSetupError::Filter(e) => write!(f, "invalid {FILTER_ENV} directive: {e}"),
            LogSetupError::AlreadySet => write!(f, "a global subscriber is already installed"),
        }
    }
}

impl std::error::Error for LogSetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LogSetupError::Open(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for LogSetupError {
    fn from(e: io::Error) -> Self {
        LogSetupError::Open(e)
    }
}

pub fn open_log_file(path: &Path) -> Result<File, LogSetupError> {
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Build the filter from `directive`, falling back to `info` when unset.
pub fn build_filter(directive: Option<&str>) -> Result<EnvFilter, LogSetupError> {
    let directive = directive
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(DEFAULT_FILTER);
    EnvFilter::try_new(directive).map_err(|e| LogSetupError::Filter(e.to_string()))
}

/// Install the global subscriber writing to `path`.
pub fn init(path: &Path) -> Result<(), LogSetupError> {
    let file = open_log_file(path)?;
    let directive = std::env::var(FILTER_ENV).ok();
    let filter = build_filter(directive.as_deref())?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|_| LogSetupError::AlreadySet)
}
