// src/lib.rs

#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

pub mod config;
pub mod core;
pub mod driver;
pub mod locks;
pub mod progress;
pub mod scrape;
pub mod select;
pub mod server;
pub mod store;
pub mod updater;

#[cfg(feature = "cli")]
pub mod cli;
