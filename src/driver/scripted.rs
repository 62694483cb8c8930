// src/driver/scripted.rs
//
// In-process surface that replays a fixed reveal sequence: frame N is what
// the page shows after N scrolls. Used by tests and offline demos.

use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;

use super::{DriverError, PageSurface, SurfaceLauncher};

/// Counters shared by a launcher and every surface it opened.
#[derive(Debug, Default)]
pub struct SurfaceStats {
    opened: AtomicUsize,
    closed: AtomicUsize,
    scrolls: AtomicUsize,
    last_url: Mutex<Option<String>>,
    last_user_agent: Mutex<Option<String>>,
}

impl SurfaceStats {
    pub fn opened(&self) -> usize { self.opened.load(Ordering::SeqCst) }
    pub fn closed(&self) -> usize { self.closed.load(Ordering::SeqCst) }
    pub fn scrolls(&self) -> usize { self.scrolls.load(Ordering::SeqCst) }

    pub fn last_url(&self) -> Option<String> {
        self.last_url.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn last_user_agent(&self) -> Option<String> {
        self.last_user_agent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[derive(Clone, Debug)]
enum Script {
    Frames(Vec<Vec<String>>),
    /// Every scroll reveals `step` more references, forever.
    Endless { step: usize },
}

#[derive(Clone, Copy, Debug, Default)]
struct Faults {
    open: bool,
    navigate: bool,
    extract_at: Option<usize>,
    scroll_at: Option<usize>,
}

pub struct ScriptedLauncher {
    script: Mutex<Script>,
    faults: Faults,
    stats: Arc<SurfaceStats>,
}

impl ScriptedLauncher {
    pub fn new(frames: &[&[&str]]) -> Self {
        Self::from_script(Script::Frames(to_frames(frames)))
    }

    /// A board that never stops growing.
    pub fn endless(step: usize) -> Self {
        Self::from_script(Script::Endless { step: step.max(1) })
    }

    fn from_script(script: Script) -> Self {
        Self {
            script: Mutex::new(script),
            faults: Faults::default(),
            stats: Arc::new(SurfaceStats::default()),
        }
    }

    /// Replace the reveal sequence for surfaces opened from now on.
    pub fn set_frames(&self, frames: &[&[&str]]) {
        *self.script.lock().unwrap_or_else(PoisonError::into_inner) = Script::Frames(to_frames(frames));
    }

    pub fn failing_open(mut self) -> Self {
        self.faults.open = true;
        self
    }

    pub fn failing_navigation(mut self) -> Self {
        self.faults.navigate = true;
        self
    }

    /// Fail the extract call made after `scrolls` scrolls.
    pub fn failing_extract_at(mut self, scrolls: usize) -> Self {
        self.faults.extract_at = Some(scrolls);
        self
    }

    /// Fail the scroll attempted after `scrolls` successful scrolls.
    pub fn failing_scroll_at(mut self, scrolls: usize) -> Self {
        self.faults.scroll_at = Some(scrolls);
        self
    }

    pub fn stats(&self) -> Arc<SurfaceStats> {
        Arc::clone(&self.stats)
    }
}

fn to_frames(frames: &[&[&str]]) -> Vec<Vec<String>> {
    frames
        .iter()
        .map(|f| f.iter().map(|s| s!(*s)).collect())
        .collect()
}

#[async_trait]
impl SurfaceLauncher for ScriptedLauncher {
    async fn open(&self, user_agent: &str) -> Result<Box<dyn PageSurface>, DriverError> {
        if self.faults.open {
            return Err(DriverError::Launch(s!("scripted launch failure")));
        }
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        *self.stats.last_user_agent.lock().unwrap_or_else(PoisonError::into_inner) = Some(s!(user_agent));

        let script = self.script.lock().unwrap_or_else(PoisonError::into_inner).clone();
        Ok(Box::new(ScriptedSurface {
            script,
            faults: self.faults,
            stats: Arc::clone(&self.stats),
            scrolls: 0,
        }))
    }
}

struct ScriptedSurface {
    script: Script,
    faults: Faults,
    stats: Arc<SurfaceStats>,
    scrolls: usize,
}

#[async_trait]
impl PageSurface for ScriptedSurface {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        *self.stats.last_url.lock().unwrap_or_else(PoisonError::into_inner) = Some(s!(url));
        if self.faults.navigate {
            return Err(DriverError::Navigate { url: s!(url), reason: s!("scripted navigation failure") });
        }
        Ok(())
    }

    async fn extract(&mut self) -> Result<Vec<String>, DriverError> {
        if self.faults.extract_at == Some(self.scrolls) {
            return Err(DriverError::Script(format!("scripted extract failure after {} scrolls", self.scrolls)));
        }
        Ok(match &self.script {
            Script::Frames(frames) => match frames.len() {
                0 => Vec::new(),
                n => frames[self.scrolls.min(n - 1)].clone(),
            },
            Script::Endless { step } => (0..(self.scrolls + 1) * step)
                .map(|i| format!("https://i.example.com/endless/{i}.jpg"))
                .collect(),
        })
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), DriverError> {
        if self.faults.scroll_at == Some(self.scrolls) {
            return Err(DriverError::Script(format!("scripted scroll failure after {} scrolls", self.scrolls)));
        }
        self.scrolls += 1;
        self.stats.scrolls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        self.stats.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
