// src/scrape/board.rs
//
// Progressive extraction: extract → compare → scroll → settle, until an
// extract pass finds nothing new or a bound is reached.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tokio::time::{self, Instant};

use crate::{
    config::ScrapeOptions,
    core::{BoardKey, ImageRef, locator::match_key},
    driver::{DriverError, PageSurface, SurfaceLauncher},
    progress::Progress,
};

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("board {key} could not be loaded: {source}")]
    PageLoad { key: BoardKey, #[source] source: DriverError },
    #[error("no images found on board {0}")]
    NoContent(BoardKey),
    #[error("browser failed while scraping {key}: {source}")]
    Driver { key: BoardKey, #[source] source: DriverError },
}

/// Which limit cut a scrape short.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Rounds,
    Elapsed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    /// The last extract pass found nothing new.
    Stable,
    /// Stopped by a bound while the board was still growing.
    Partial(Bound),
}

impl Completion {
    pub fn is_partial(&self) -> bool { matches!(self, Completion::Partial(_)) }
}

#[derive(Clone, Debug)]
pub struct ScrapeOutcome {
    /// Unique references in first-discovery order.
    pub images: Vec<ImageRef>,
    pub rounds: u32,
    pub completion: Completion,
}

pub struct BoardScraper {
    launcher: Arc<dyn SurfaceLauncher>,
    opts: ScrapeOptions,
}

impl BoardScraper {
    pub fn new(launcher: Arc<dyn SurfaceLauncher>, opts: ScrapeOptions) -> Self {
        Self { launcher, opts }
    }

    pub fn options(&self) -> &ScrapeOptions { &self.opts }

    /// Scrape every reachable image on the board. The surface is closed
    /// exactly once whether the loop finishes, hits a bound or fails.
    pub async fn scrape(
        &self,
        key: &BoardKey,
        mut progress: Option<&mut dyn Progress>,
    ) -> Result<ScrapeOutcome, ScrapeError> {
        let url = key.board_url(&self.opts.board_host);
        logf!("Scrape: Begin board={key} url={url}");

        let mut surface = match self.launcher.open(&self.opts.user_agent).await {
            Ok(s) => s,
            Err(source) => {
                if let Some(p) = progress {
                    p.finish();
                }
                return Err(ScrapeError::PageLoad { key: key.clone(), source });
            }
        };

        let result = self.run(surface.as_mut(), key, &url, progress.as_deref_mut()).await;

        if let Err(e) = surface.close().await {
            logw!("Scrape: Surface close failed board={key}: {e}");
        }
        if let Some(p) = progress {
            p.finish();
        }

        let outcome = result?;
        if outcome.images.is_empty() {
            logf!("Scrape: Empty board={key} rounds={}", outcome.rounds);
            return Err(ScrapeError::NoContent(key.clone()));
        }
        match outcome.completion {
            Completion::Stable => logf!(
                "Scrape: OK board={key} images={} rounds={}",
                outcome.images.len(),
                outcome.rounds
            ),
            Completion::Partial(bound) => logw!(
                "Scrape: Partial board={key} images={} rounds={} bound={bound:?}",
                outcome.images.len(),
                outcome.rounds
            ),
        }
        Ok(outcome)
    }

    async fn run<'p>(
        &self,
        surface: &mut dyn PageSurface,
        key: &BoardKey,
        url: &str,
        mut progress: Option<&mut (dyn Progress + 'p)>,
    ) -> Result<ScrapeOutcome, ScrapeError> {
        surface
            .navigate(url)
            .await
            .map_err(|source| ScrapeError::PageLoad { key: key.clone(), source })?;
        if let Some(p) = progress.as_deref_mut() {
            p.begin(key);
        }

        let driver_err = |source| ScrapeError::Driver { key: key.clone(), source };
        let max_rounds = self.opts.max_rounds.max(1);
        let started = Instant::now();

        let mut seen: HashSet<String> = HashSet::new();
        let mut images: Vec<ImageRef> = Vec::new();
        let mut prev_count = 0usize;
        let mut rounds = 0u32;

        let completion = loop {
            let found = surface.extract().await.map_err(driver_err)?;
            rounds += 1;

            for raw in found {
                if seen.insert(match_key(self.opts.match_mode, &raw).into_owned()) {
                    images.push(ImageRef::from(raw));
                }
            }
            logd!("Scrape: Round {rounds} board={key} total={}", images.len());
            if let Some(p) = progress.as_deref_mut() {
                p.round_done(rounds, images.len());
            }

            if images.len() == prev_count {
                break Completion::Stable;
            }
            prev_count = images.len();

            if rounds >= max_rounds {
                break Completion::Partial(Bound::Rounds);
            }
            if started.elapsed() + self.opts.settle > self.opts.max_elapsed {
                break Completion::Partial(Bound::Elapsed);
            }

            surface.scroll_to_bottom().await.map_err(driver_err)?;
            time::sleep(self.opts.settle).await;
        };

        if let (Completion::Partial(bound), Some(p)) = (completion, progress) {
            p.log(&format!("Stopped at the {bound:?} limit with {} images", images.len()));
        }
        Ok(ScrapeOutcome { images, rounds, completion })
    }
}
