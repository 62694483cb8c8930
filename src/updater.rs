// src/updater.rs
//
// Append-only reconciliation of a fresh scrape with the cached collection.
// load → scrape → merge → save runs under the board's lock, so two requests
// for the same board never interleave their read-modify-write.

use std::collections::HashSet;

use crate::{
    config::MatchMode,
    core::{BoardKey, ImageRef, ReferenceCollection, locator::match_key},
    locks::KeyLocks,
    progress::Progress,
    scrape::{BoardScraper, Completion, ScrapeError},
    store::{CacheError, CacheStore},
};

#[derive(Clone, Debug)]
pub struct UpdateOutcome {
    /// Cached collection after the merge.
    pub images: ReferenceCollection,
    /// References appended by this update.
    pub added: usize,
    /// `None` when the scrape found nothing and the cache was served as is.
    pub completion: Option<Completion>,
    /// Whether the merged collection reached disk.
    pub saved: bool,
}

/// Scraped references not already known, in scrape order.
pub fn new_references(known: &ReferenceCollection, scraped: &[ImageRef], mode: MatchMode) -> Vec<ImageRef> {
    let mut seen: HashSet<String> = known
        .iter()
        .map(|r| match_key(mode, r.as_str()).into_owned())
        .collect();
    scraped
        .iter()
        .filter(|r| seen.insert(match_key(mode, r.as_str()).into_owned()))
        .cloned()
        .collect()
}

pub struct CacheUpdater {
    store: CacheStore,
    scraper: BoardScraper,
    locks: KeyLocks,
}

impl CacheUpdater {
    pub fn new(store: CacheStore, scraper: BoardScraper) -> Self {
        Self { store, scraper, locks: KeyLocks::new() }
    }

    pub fn store(&self) -> &CacheStore { &self.store }
    pub fn scraper(&self) -> &BoardScraper { &self.scraper }

    /// Bring the cache for `key` up to date and return it.
    ///
    /// An empty cache is filled with the whole scrape. A non-empty cache only
    /// grows: new references are appended and nothing is written when there
    /// are none. Save failures are logged and the merged collection is still
    /// returned. A scrape that finds nothing leaves a non-empty cache as is.
    /// A cache file that exists but cannot be read is never overwritten.
    pub async fn update(
        &self,
        key: &BoardKey,
        progress: Option<&mut dyn Progress>,
    ) -> Result<UpdateOutcome, ScrapeError> {
        let _guard = self.locks.lock(key).await;

        // An unreadable file may still hold references, so it is never
        // overwritten. A malformed one is replaced.
        let (mut images, writable) = match self.store.read(key).await {
            Ok(found) => (found.unwrap_or_default(), true),
            Err(e @ CacheError::Read { .. }) => {
                logw!("Update: Cache unreadable, will not overwrite board={key}: {e}");
                (ReferenceCollection::new(), false)
            }
            Err(e) => {
                logw!("Update: Ignoring malformed cache board={key}: {e}");
                (ReferenceCollection::new(), true)
            }
        };
        if images.is_empty() {
            logf!("Update: Cache empty, scraping full board={key}");
        }

        let outcome = match self.scraper.scrape(key, progress).await {
            Ok(o) => o,
            Err(ScrapeError::NoContent(_)) if !images.is_empty() => {
                logw!("Update: Scrape found nothing, serving cache board={key} images={}", images.len());
                return Ok(UpdateOutcome { images, added: 0, completion: None, saved: false });
            }
            Err(e) => {
                loge!("Update: Scrape failed board={key}: {e}");
                return Err(e);
            }
        };

        let fresh = new_references(&images, &outcome.images, self.scraper.options().match_mode);
        if fresh.is_empty() {
            logd!("Update: Nothing new board={key} images={}", images.len());
            return Ok(UpdateOutcome {
                images,
                added: 0,
                completion: Some(outcome.completion),
                saved: false,
            });
        }

        let added = images.extend_new(fresh);
        if !writable {
            return Ok(UpdateOutcome { images, added, completion: Some(outcome.completion), saved: false });
        }
        let saved = match self.store.save(key, &images).await {
            Ok(path) => {
                logf!("Update: Appended board={key} added={added} total={} → {}", images.len(), path.display());
                true
            }
            Err(e) => {
                loge!("Cache: Save failed board={key}: {e}");
                false
            }
        };

        Ok(UpdateOutcome { images, added, completion: Some(outcome.completion), saved })
    }
}
