// src/cli.rs
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};

use crate::{
    config::consts::*,
    config::options::*,
    core::BoardKey,
    driver::WebDriverLauncher,
    log,
    progress::StderrProgress,
    scrape::{BoardScraper, Completion},
    select, server,
    store::CacheStore,
    updater::CacheUpdater,
};

/// Serve a random image from a lazily-loaded image board.
#[derive(Debug, Parser)]
#[command(name = "board_scrape", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT, global = true)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "BIND", default_value = DEFAULT_BIND, global = true)]
    pub bind: String,

    /// Directory holding one JSON file per board
    #[arg(long, env = "BOARD_CACHE_DIR", default_value = CACHE_DIR, global = true)]
    pub cache_dir: PathBuf,

    /// WebDriver endpoint (chromedriver / geckodriver)
    #[arg(long, env = "WEBDRIVER_URL", default_value = WEBDRIVER_URL, global = true)]
    pub webdriver: String,

    #[arg(long, value_enum, default_value_t = BrowserKind::Chrome, global = true)]
    pub browser: BrowserKind,

    /// Show the browser window
    #[arg(long, global = true)]
    pub headed: bool,

    /// Board host the owner/board path is appended to
    #[arg(long, default_value = BOARD_HOST, global = true)]
    pub board_host: String,

    /// Wait after each scroll, in milliseconds
    #[arg(long, default_value_t = SETTLE_MS, global = true)]
    pub settle_ms: u64,

    /// Stop a scrape after this many extract rounds
    #[arg(long, default_value_t = MAX_ROUNDS, global = true)]
    pub max_rounds: u32,

    /// Stop a scrape after this many seconds
    #[arg(long, default_value_t = MAX_SCRAPE_SECS, global = true)]
    pub max_scrape_secs: u64,

    /// How references are compared when deduplicating
    #[arg(long, value_enum, default_value_t = MatchMode::Exact, global = true)]
    pub match_mode: MatchMode,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = DEFAULT_LOG_LEVEL, global = true)]
    pub log_level: String,

    /// Also append logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Update the cache for one board and print its references
    Scrape(BoardArgs),
    /// Print the cached references for one board without scraping
    Show(BoardArgs),
    /// Update the cache for one board and print one random reference
    Pick(BoardArgs),
}

#[derive(Debug, Args)]
pub struct BoardArgs {
    pub owner: String,
    pub board: String,
}

impl BoardArgs {
    fn key(&self) -> Result<BoardKey> {
        BoardKey::new(self.owner.as_str(), self.board.as_str()).wrap_err("Invalid board")
    }
}

impl Cli {
    pub fn options(&self) -> AppOptions {
        AppOptions {
            server: ServerOptions { bind: self.bind.clone(), port: self.port },
            cache: CacheOptions { dir: self.cache_dir.clone() },
            scrape: ScrapeOptions {
                board_host: self.board_host.clone(),
                user_agent: s!(USER_AGENT),
                settle: Duration::from_millis(self.settle_ms),
                max_rounds: self.max_rounds,
                max_elapsed: Duration::from_secs(self.max_scrape_secs),
                match_mode: self.match_mode,
            },
            browser: BrowserOptions {
                webdriver_url: self.webdriver.clone(),
                browser: self.browser,
                headless: !self.headed,
            },
            log: LogOptions { level: self.log_level.clone(), file: self.log_file.clone() },
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let opts = cli.options();
    log::init(&opts.log).wrap_err("Cannot initialise logging")?;

    let store = CacheStore::new(&opts.cache.dir);
    store
        .ensure_dir()
        .wrap_err_with(|| format!("Cannot create cache directory {}", opts.cache.dir.display()))?;

    let launcher = Arc::new(WebDriverLauncher::new(opts.browser.clone()));
    let scraper = BoardScraper::new(launcher, opts.scrape.clone());
    let updater = Arc::new(CacheUpdater::new(store, scraper));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => server::serve(&opts.server, updater).await.wrap_err("Server failed"),
        Command::Scrape(b) => {
            let key = b.key()?;
            let outcome = updater.update(&key, Some(&mut StderrProgress)).await?;
            for image in &outcome.images {
                println!("{image}");
            }
            let note = match outcome.completion {
                Some(Completion::Partial(bound)) => format!(" (partial: {bound:?} limit)"),
                _ => s!(),
            };
            eprintln!("{} images, {} new{note}", outcome.images.len(), outcome.added);
            Ok(())
        }
        Command::Show(b) => {
            let key = b.key()?;
            match updater.store().read(&key).await? {
                Some(images) => {
                    for image in &images {
                        println!("{image}");
                    }
                }
                None => eprintln!("No cache for {key}"),
            }
            Ok(())
        }
        Command::Pick(b) => {
            let key = b.key()?;
            let outcome = updater.update(&key, None).await?;
            println!("{}", select::pick(&outcome.images)?);
            Ok(())
        }
    }
}
