// src/locks.rs
//
// One async mutex per board key. Entries live only while someone holds or
// waits on them.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::core::BoardKey;

#[derive(Debug, Default)]
pub struct KeyLocks {
    inner: DashMap<BoardKey, Arc<Mutex<()>>>,
}

impl KeyLocks {
    pub fn new() -> Self { Self::default() }

    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: &BoardKey) -> KeyGuard<'_> {
        // clone out of the map so no shard lock is held across the await
        let mutex = Arc::clone(self.inner.entry(key.clone()).or_default().value());
        let guard = mutex.lock_owned().await;
        KeyGuard { locks: self, key: key.clone(), guard: Some(guard) }
    }

    /// Keys currently held or waited on.
    pub fn len(&self) -> usize { self.inner.len() }
    pub fn is_empty(&self) -> bool { self.inner.is_empty() }
}

pub struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: BoardKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // map's own reference is the only one left → nobody is waiting
        self.locks.inner.remove_if(&self.key, |_, m| Arc::strong_count(m) == 1);
    }
}
