// src/scrape/mod.rs
mod board;

pub use board::{BoardScraper, Bound, Completion, ScrapeError, ScrapeOutcome};
