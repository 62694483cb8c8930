// src/core/locator.rs
//
// Comparison keys for image references. The stored string is never
// rewritten; only the key used to decide "seen before?" changes with the
// match mode.

use std::borrow::Cow;

use url::Url;

use crate::config::MatchMode;

/// Key used for duplicate detection under `mode`.
pub fn match_key(mode: MatchMode, reference: &str) -> Cow<'_, str> {
    match mode {
        MatchMode::Exact => Cow::Borrowed(reference),
        MatchMode::Normalized => normalize(reference),
    }
}

/// Parse and reserialize as a URL: lowercases scheme and host, drops the
/// default port, resolves dot segments, normalizes percent-encoding and
/// removes the fragment. Strings that do not parse compare verbatim.
pub fn normalize(reference: &str) -> Cow<'_, str> {
    match Url::parse(reference.trim()) {
        Ok(mut url) => {
            url.set_fragment(None);
            Cow::Owned(url.into())
        }
        Err(_) => Cow::Borrowed(reference),
    }
}
