// src/log.rs
//
// Thin layer over `tracing`: the crate logs through the short macros below,
// and `init` installs the subscriber once per process.

use std::fs::{self, OpenOptions};
use std::io;
use std::sync::Arc;

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, time::Uptime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::options::LogOptions;

/// Install the global subscriber: stderr always, plus a plain-text file when
/// `opts.file` is set. `RUST_LOG` wins over `opts.level` when present.
pub fn init(opts: &LogOptions) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&opts.level));

    let stderr_layer = fmt::layer()
        .with_timer(Uptime::default())
        .with_target(false)
        .with_writer(io::stderr);

    let file_layer = match &opts.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_timer(Uptime::default())
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(io::Error::other)
}

/// Info-level logging
#[macro_export]
macro_rules! logf {
    ($($arg:tt)*) => {
        ::tracing::info!($($arg)*)
    };
}

/// Debug-level logging
#[macro_export]
macro_rules! logd {
    ($($arg:tt)*) => {
        ::tracing::debug!($($arg)*)
    };
}

/// Warn-level logging
#[macro_export]
macro_rules! logw {
    ($($arg:tt)*) => {
        ::tracing::warn!($($arg)*)
    };
}

/// Error-level logging
#[macro_export]
macro_rules! loge {
    ($($arg:tt)*) => {
        ::tracing::error!($($arg)*)
    };
}
