// src/store.rs
//
// One JSON file per board: `<dir>/<owner>_<board>.json`
// holding `{"images": [...]}` in discovery order.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::consts::{CACHE_EXT, CACHE_SEP};
use crate::core::{BoardKey, ImageRef, ReferenceCollection};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, #[source] source: io::Error },
    #[error("malformed cache file {}: {source}", path.display())]
    Malformed { path: PathBuf, #[source] source: serde_json::Error },
    #[error("cannot encode cache for {key}: {source}")]
    Encode { key: BoardKey, #[source] source: serde_json::Error },
    #[error("cannot write {}: {source}", path.display())]
    Write { path: PathBuf, #[source] source: io::Error },
}

#[derive(Deserialize)]
struct CacheFile {
    #[serde(default)]
    images: Vec<ImageRef>,
}

#[derive(Serialize)]
struct CacheFileRef<'a> {
    images: &'a [ImageRef],
}

#[derive(Clone, Debug)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path { &self.dir }

    /// Create the cache directory if missing.
    pub fn ensure_dir(&self) -> io::Result<()> {
        if self.dir.exists() && !self.dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Path exists but is not a directory: {}", self.dir.display()),
            ));
        }
        fs::create_dir_all(&self.dir)
    }

    pub fn path_for(&self, key: &BoardKey) -> PathBuf {
        self.dir.join(format!("{}{CACHE_SEP}{}.{CACHE_EXT}", key.owner(), key.board()))
    }

    /// Known references for `key`. Missing, unreadable or malformed files
    /// all mean "nothing known yet".
    pub async fn load(&self, key: &BoardKey) -> ReferenceCollection {
        match self.read(key).await {
            Ok(Some(c)) => {
                logd!("Cache: Loaded board={key} images={}", c.len());
                c
            }
            Ok(None) => {
                logd!("Cache: Miss board={key}");
                ReferenceCollection::new()
            }
            Err(e) => {
                logw!("Cache: Ignoring unreadable cache board={key}: {e}");
                ReferenceCollection::new()
            }
        }
    }

    /// Strict variant of `load`: `Ok(None)` when no file exists.
    pub async fn read(&self, key: &BoardKey) -> Result<Option<ReferenceCollection>, CacheError> {
        let path = self.path_for(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CacheError::Read { path, source }),
        };
        let file: CacheFile = serde_json::from_slice(&bytes)
            .map_err(|source| CacheError::Malformed { path, source })?;
        // hand-edited files may repeat entries; first occurrence wins
        Ok(Some(file.images.into_iter().collect()))
    }

    /// Write the whole collection. Goes through a sibling temp file so a
    /// reader never sees a half-written cache.
    pub async fn save(&self, key: &BoardKey, images: &ReferenceCollection) -> Result<PathBuf, CacheError> {
        let path = self.path_for(key);
        let body = serde_json::to_vec_pretty(&CacheFileRef { images: images.as_slice() })
            .map_err(|source| CacheError::Encode { key: key.clone(), source })?;

        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &body)
            .await
            .map_err(|source| CacheError::Write { path: tmp.clone(), source })?;
        if let Err(source) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(CacheError::Write { path, source });
        }
        logd!("Cache: Saved board={key} images={} → {}", images.len(), path.display());
        Ok(path)
    }
}
