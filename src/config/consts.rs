// src/config/consts.rs

// Board source
pub const BOARD_HOST: &str = "https://www.pinterest.com";
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115 Safari/537.36";

// Scrape loop
pub const SETTLE_MS: u64 = 2_500; // lazy content render time after a scroll
pub const MAX_ROUNDS: u32 = 200;
pub const MAX_SCRAPE_SECS: u64 = 300;

// Local cache
pub const CACHE_DIR: &str = "cache";
pub const CACHE_SEP: char = '_';
pub const CACHE_EXT: &str = "json";

// Server
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

// Browser
pub const WEBDRIVER_URL: &str = "http://localhost:4444";

// Logging
pub const DEFAULT_LOG_LEVEL: &str = "info";
