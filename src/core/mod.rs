// src/core/mod.rs

pub mod board;
pub mod locator;
pub mod sanitize;

pub use board::{BoardKey, ImageRef, ReferenceCollection};
pub use sanitize::KeyError;
