// tests/updater.rs
//
// Append-only cache reconciliation, end to end through the cache files.
//
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use board_scrape::config::ScrapeOptions;
use board_scrape::core::{BoardKey, ImageRef, ReferenceCollection};
use board_scrape::driver::{DriverError, PageSurface, ScriptedLauncher, SurfaceLauncher};
use board_scrape::scrape::{BoardScraper, ScrapeError};
use board_scrape::store::CacheStore;
use board_scrape::updater::CacheUpdater;

fn fast_opts() -> ScrapeOptions {
    ScrapeOptions { settle: Duration::ZERO, ..ScrapeOptions::default() }
}

fn key() -> BoardKey {
    BoardKey::new("u", "b").unwrap()
}

fn updater(dir: &Path, launcher: Arc<dyn SurfaceLauncher>) -> CacheUpdater {
    CacheUpdater::new(CacheStore::new(dir), BoardScraper::new(launcher, fast_opts()))
}

fn cache_json(dir: &Path) -> serde_json::Value {
    let text = fs::read_to_string(dir.join("u_b.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn strs(c: &ReferenceCollection) -> Vec<&str> {
    c.iter().map(ImageRef::as_str).collect()
}

#[tokio::test]
async fn first_request_fills_empty_cache() {
    let dir = tempfile::tempdir().unwrap();
    let launcher = Arc::new(ScriptedLauncher::new(&[&["a", "b", "c"]]));
    let up = updater(dir.path(), launcher);

    let out = up.update(&key(), None).await.unwrap();

    assert_eq!(strs(&out.images), ["a", "b", "c"]);
    assert_eq!(out.added, 3);
    assert!(out.saved);
    assert_eq!(cache_json(dir.path()), serde_json::json!({ "images": ["a", "b", "c"] }));
}

#[tokio::test]
async fn appends_only_new_references_in_order() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("u_b.json"), r#"{"images":["a","b"]}"#).unwrap();
    let launcher = Arc::new(ScriptedLauncher::new(&[&["b", "c"]]));
    let up = updater(dir.path(), launcher);

    let out = up.update(&key(), None).await.unwrap();

    assert_eq!(strs(&out.images), ["a", "b", "c"]);
    assert_eq!(out.added, 1);
    assert_eq!(cache_json(dir.path()), serde_json::json!({ "images": ["a", "b", "c"] }));
}

#[tokio::test]
async fn repeat_update_with_same_scrape_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let launcher = Arc::new(ScriptedLauncher::new(&[&["a", "b"]]));
    let up = updater(dir.path(), launcher);

    up.update(&key(), None).await.unwrap();
    let path = dir.path().join("u_b.json");
    let before = fs::read(&path).unwrap();
    let mtime = fs::metadata(&path).unwrap().modified().unwrap();

    let out = up.update(&key(), None).await.unwrap();

    assert_eq!(out.added, 0);
    assert!(!out.saved);
    assert_eq!(fs::read(&path).unwrap(), before);
    assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), mtime);
}

#[tokio::test]
async fn never_drops_known_references() {
    let dir = tempfile::tempdir().unwrap();
    let launcher = Arc::new(ScriptedLauncher::new(&[&["a", "b"]]));
    let up = updater(dir.path(), launcher.clone());

    let scrapes: [&[&str]; 4] = [&["a", "b"], &["c"], &["b", "d"], &["x"]];
    let mut known: Vec<String> = Vec::new();
    for frame in scrapes {
        launcher.set_frames(&[frame]);
        let out = up.update(&key(), None).await.unwrap();
        let now = strs(&out.images);
        // old entries keep their positions
        assert_eq!(&now[..known.len()], known.iter().map(String::as_str).collect::<Vec<_>>());
        known = now.iter().map(|s| s.to_string()).collect();
    }
    assert_eq!(known, ["a", "b", "c", "d", "x"]);
}

#[tokio::test]
async fn empty_scrape_serves_existing_cache() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("u_b.json"), r#"{"images":["a"]}"#).unwrap();
    let launcher = Arc::new(ScriptedLauncher::new(&[]));
    let up = updater(dir.path(), launcher);

    let out = up.update(&key(), None).await.unwrap();
    assert_eq!(strs(&out.images), ["a"]);
    assert!(out.completion.is_none());
}

#[tokio::test]
async fn empty_scrape_and_empty_cache_is_no_content() {
    let dir = tempfile::tempdir().unwrap();
    let launcher = Arc::new(ScriptedLauncher::new(&[]));
    let up = updater(dir.path(), launcher);

    let err = up.update(&key(), None).await.unwrap_err();
    assert!(matches!(err, ScrapeError::NoContent(_)));
    assert!(!dir.path().join("u_b.json").exists());
}

#[tokio::test]
async fn page_load_failure_propagates_and_leaves_cache() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("u_b.json"), r#"{"images":["a"]}"#).unwrap();
    let launcher = Arc::new(ScriptedLauncher::new(&[&["b"]]).failing_navigation());
    let up = updater(dir.path(), launcher);

    let err = up.update(&key(), None).await.unwrap_err();
    assert!(matches!(err, ScrapeError::PageLoad { .. }));
    assert_eq!(cache_json(dir.path()), serde_json::json!({ "images": ["a"] }));
}

#[tokio::test]
async fn corrupt_cache_is_treated_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("u_b.json"), "{not json").unwrap();
    let launcher = Arc::new(ScriptedLauncher::new(&[&["a"]]));
    let up = updater(dir.path(), launcher);

    let out = up.update(&key(), None).await.unwrap();
    assert_eq!(strs(&out.images), ["a"]);
    assert_eq!(cache_json(dir.path()), serde_json::json!({ "images": ["a"] }));
}

#[tokio::test]
async fn save_failure_still_returns_merged_images() {
    let dir = tempfile::tempdir().unwrap();
    // cache dir never created → write fails
    let launcher = Arc::new(ScriptedLauncher::new(&[&["a", "b"]]));
    let up = updater(&dir.path().join("missing"), launcher);

    let out = up.update(&key(), None).await.unwrap();
    assert_eq!(strs(&out.images), ["a", "b"]);
    assert!(!out.saved);
}

#[tokio::test]
async fn unreadable_cache_is_served_but_never_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    // a directory where the file should be: exists, but reading it fails
    let path = dir.path().join("u_b.json");
    fs::create_dir(&path).unwrap();
    let launcher = Arc::new(ScriptedLauncher::new(&[&["a", "b"]]));
    let up = updater(dir.path(), launcher);

    let out = up.update(&key(), None).await.unwrap();

    assert_eq!(strs(&out.images), ["a", "b"]);
    assert_eq!(out.added, 2);
    assert!(!out.saved);
    assert!(path.is_dir());
    assert!(!dir.path().join("u_b.json.tmp").exists());
}

/* ---------------- concurrent updates ---------------- */

/// Each opened surface shows the next queued frame, after a delay long
/// enough for a competing request to load the same base collection.
struct QueuedLauncher {
    frames: Mutex<VecDeque<Vec<String>>>,
}

struct QueuedSurface {
    frame: Vec<String>,
}

#[async_trait]
impl SurfaceLauncher for QueuedLauncher {
    async fn open(&self, _user_agent: &str) -> Result<Box<dyn PageSurface>, DriverError> {
        let frame = self.frames.lock().unwrap().pop_front().unwrap_or_default();
        Ok(Box::new(QueuedSurface { frame }))
    }
}

#[async_trait]
impl PageSurface for QueuedSurface {
    async fn navigate(&mut self, _url: &str) -> Result<(), DriverError> { Ok(()) }

    async fn extract(&mut self) -> Result<Vec<String>, DriverError> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(self.frame.clone())
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), DriverError> { Ok(()) }
    async fn close(&mut self) -> Result<(), DriverError> { Ok(()) }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_for_one_board_lose_nothing() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("u_b.json"), r#"{"images":["base"]}"#).unwrap();

    let queued: Vec<Vec<String>> = (0..8).map(|i| vec![format!("img-{i}")]).collect();
    let launcher = Arc::new(QueuedLauncher { frames: Mutex::new(queued.into()) });
    let up = Arc::new(updater(dir.path(), launcher));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let up = Arc::clone(&up);
            tokio::spawn(async move { up.update(&key(), None).await.map(|o| o.images.len()) })
        })
        .collect();
    for t in tasks {
        t.await.unwrap().unwrap();
    }

    let json = cache_json(dir.path());
    let images = json["images"].as_array().unwrap();
    assert_eq!(images.len(), 9, "{json}");
    assert_eq!(images[0], "base");
    for i in 0..8 {
        assert!(images.iter().any(|v| v == &serde_json::json!(format!("img-{i}"))));
    }
}
