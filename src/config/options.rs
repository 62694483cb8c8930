// src/config/options.rs
use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use super::consts::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppOptions {
    pub server: ServerOptions,
    pub cache: CacheOptions,
    pub scrape: ScrapeOptions,
    pub browser: BrowserOptions,
    pub log: LogOptions,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            server: ServerOptions::default(),
            cache: CacheOptions::default(),
            scrape: ScrapeOptions::default(),
            browser: BrowserOptions::default(),
            log: LogOptions::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerOptions {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self { bind: s!(DEFAULT_BIND), port: DEFAULT_PORT }
    }
}

impl ServerOptions {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheOptions {
    pub dir: PathBuf,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self { dir: PathBuf::from(CACHE_DIR) }
    }
}

/// How two references are compared when deduplicating.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum MatchMode {
    /// Byte-for-byte string equality.
    #[default]
    Exact,
    /// Compare parsed-and-reserialized URLs (see `core::locator`).
    Normalized,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrapeOptions {
    pub board_host: String,
    pub user_agent: String,
    /// Pause after each scroll so lazy content can render.
    pub settle: Duration,
    /// Hard cap on extract rounds per scrape.
    pub max_rounds: u32,
    /// Hard cap on wall time per scrape.
    pub max_elapsed: Duration,
    pub match_mode: MatchMode,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            board_host: s!(BOARD_HOST),
            user_agent: s!(USER_AGENT),
            settle: Duration::from_millis(SETTLE_MS),
            max_rounds: MAX_ROUNDS,
            max_elapsed: Duration::from_secs(MAX_SCRAPE_SECS),
            match_mode: MatchMode::Exact,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum BrowserKind {
    #[default]
    Chrome,
    Firefox,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrowserOptions {
    pub webdriver_url: String,
    pub browser: BrowserKind,
    pub headless: bool,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            webdriver_url: s!(WEBDRIVER_URL),
            browser: BrowserKind::Chrome,
            headless: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogOptions {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self { level: s!(DEFAULT_LOG_LEVEL), file: None }
    }
}
