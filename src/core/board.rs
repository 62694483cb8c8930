// src/core/board.rs
//
// Domain types shared by the scraper, the cache and the server.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::sanitize::{KeyError, check_segment};

/// (owner, board) pair naming one remote board and one cache file.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoardKey {
    owner: String,
    board: String,
}

impl BoardKey {
    pub fn new(owner: impl Into<String>, board: impl Into<String>) -> Result<Self, KeyError> {
        let owner = owner.into();
        let board = board.into();
        check_segment("owner", &owner)?;
        check_segment("board", &board)?;
        Ok(Self { owner, board })
    }

    pub fn owner(&self) -> &str { &self.owner }
    pub fn board(&self) -> &str { &self.board }

    /// `<host>/<owner>/<board>/`
    pub fn board_url(&self, host: &str) -> String {
        format!("{}/{}/{}/", host.trim_end_matches('/'), self.owner, self.board)
    }
}

impl fmt::Display for BoardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.board)
    }
}

/// One image locator, compared as an opaque string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageRef {
    fn from(s: &str) -> Self { Self(s!(s)) }
}

impl From<String> for ImageRef {
    fn from(s: String) -> Self { Self(s) }
}

/// Ordered, duplicate-free list of references. Order is first-discovery
/// order and is what gets persisted.
#[derive(Clone, Debug, Default)]
pub struct ReferenceCollection {
    images: Vec<ImageRef>,
    seen: HashSet<ImageRef>,
}

impl ReferenceCollection {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.images.len() }
    pub fn is_empty(&self) -> bool { self.images.is_empty() }
    pub fn as_slice(&self) -> &[ImageRef] { &self.images }
    pub fn iter(&self) -> std::slice::Iter<'_, ImageRef> { self.images.iter() }

    /// Append if not already present. Returns whether it was added.
    pub fn push(&mut self, r: ImageRef) -> bool {
        if self.seen.contains(&r) {
            return false;
        }
        self.seen.insert(r.clone());
        self.images.push(r);
        true
    }

    /// Append each reference not already present, keeping their order.
    /// Returns how many were added.
    pub fn extend_new<I: IntoIterator<Item = ImageRef>>(&mut self, refs: I) -> usize {
        refs.into_iter().map(|r| self.push(r)).filter(|&added| added).count()
    }
}

impl PartialEq for ReferenceCollection {
    fn eq(&self, other: &Self) -> bool { self.images == other.images }
}

impl Eq for ReferenceCollection {}

impl FromIterator<ImageRef> for ReferenceCollection {
    fn from_iter<I: IntoIterator<Item = ImageRef>>(iter: I) -> Self {
        let mut c = Self::new();
        c.extend_new(iter);
        c
    }
}

impl<'a> IntoIterator for &'a ReferenceCollection {
    type Item = &'a ImageRef;
    type IntoIter = std::slice::Iter<'a, ImageRef>;
    fn into_iter(self) -> Self::IntoIter { self.images.iter() }
}
