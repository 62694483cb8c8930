// src/driver/mod.rs
//
// The rendering surface the scraper drives. Real browsers sit behind
// `SurfaceLauncher`/`PageSurface`; tests use the scripted surface instead.

use async_trait::async_trait;
use thiserror::Error;

pub mod scripted;
#[cfg(feature = "browser-native")]
pub mod webdriver;

pub use scripted::ScriptedLauncher;
#[cfg(feature = "browser-native")]
pub use webdriver::WebDriverLauncher;

/// Probe run against the live DOM. Per `<img>`: `src`, then `srcset`, then
/// `data-src`; first non-empty wins, empties are dropped.
pub const EXTRACT_SCRIPT: &str = r#"
return Array.from(document.querySelectorAll("img"))
    .map(img => img.src || img.srcset || img.getAttribute("data-src"))
    .filter(Boolean);
"#;

pub const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight);";

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("could not start browser session: {0}")]
    Launch(String),
    #[error("navigation to {url} failed: {reason}")]
    Navigate { url: String, reason: String },
    #[error("page script failed: {0}")]
    Script(String),
    #[error("unexpected probe result: {0}")]
    Decode(String),
    #[error("could not close browser session: {0}")]
    Close(String),
}

/// Opens one surface per scrape. Shared across requests.
#[async_trait]
pub trait SurfaceLauncher: Send + Sync {
    /// Start a fresh surface that identifies itself with `user_agent`.
    async fn open(&self, user_agent: &str) -> Result<Box<dyn PageSurface>, DriverError>;
}

/// One live page. The owner must call `close` exactly once, whatever
/// happened before.
#[async_trait]
pub trait PageSurface: Send {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError>;

    /// Image references visible in the current rendered state, in DOM order.
    async fn extract(&mut self) -> Result<Vec<String>, DriverError>;

    async fn scroll_to_bottom(&mut self) -> Result<(), DriverError>;

    async fn close(&mut self) -> Result<(), DriverError>;
}
