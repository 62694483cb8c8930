// src/progress.rs
use crate::core::BoardKey;

/// Lightweight progress reporting for long-running scrapes.
/// Frontends implement this to surface status; the server passes none.
pub trait Progress: Send {
    /// Called once the surface is open and the board page requested.
    fn begin(&mut self, _key: &BoardKey) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// One extract pass finished; `total` is the running unique count.
    fn round_done(&mut self, _round: u32, _total: usize) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// Prints one line per round to stderr.
pub struct StderrProgress;

impl Progress for StderrProgress {
    fn begin(&mut self, key: &BoardKey) {
        eprintln!("Scraping {key}…");
    }

    fn log(&mut self, msg: &str) {
        eprintln!("{msg}");
    }

    fn round_done(&mut self, round: u32, total: usize) {
        eprintln!("  round {round:>3}: {total} images");
    }
}
