// ===============================
// src/logging.rs
// ===============================
//
// Setup sekali di startup: file log (append, tanpa ANSI) + mirror ke stdout.
// Crate ini INFO+, library pihak ketiga WARN+. `RUST_LOG` menimpa default.
//
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::{info_span, Span};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::VenueMode;

pub const DEFAULT_DIRECTIVES: &str = "info,reqwest=warn,hyper=warn,h2=warn,rustls=warn";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),
    #[error("logging was already configured: {0}")]
    AlreadyInit(#[from] TryInitError),
}

/// Handle to the process-wide log setup. Created once by [`init`].
#[derive(Debug)]
pub struct LogContext {
    file: PathBuf,
}

impl LogContext {
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Span the trading facade runs every call under.
    pub fn venue_span(&self, mode: VenueMode, endpoint: &str) -> Span {
        info_span!("venue", mode = %mode, endpoint = %endpoint)
    }
}

fn env_filter() -> Result<EnvFilter, ParseError> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(dirs) if !dirs.trim().is_empty() => EnvFilter::try_new(dirs),
        _ => EnvFilter::try_new(DEFAULT_DIRECTIVES),
    }
}

fn open_append(path: &Path) -> Result<fs::File, LoggingError> {
    let open_err = |source| LoggingError::Open { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(open_err)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path).map_err(open_err)
}

pub fn init(path: &Path) -> Result<LogContext, LoggingError> {
    let file = open_append(path)?;

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_filter(env_filter()?);

    let stdout_layer = fmt::layer()
        .with_writer(io::stdout)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_filter(env_filter()?);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()?;

    Ok(LogContext { file: path.to_path_buf() })
}
