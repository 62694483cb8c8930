// src/core/sanitize.rs
//
// Board key segments end up verbatim in a cache file name, so they are
// checked rather than rewritten: anything that could escape the cache
// directory or confuse the file system is rejected.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("{0} is empty")]
    Empty(&'static str),
    #[error("{field} contains a path separator: {value:?}")]
    Separator { field: &'static str, value: String },
    #[error("{field} is a relative path component: {value:?}")]
    Relative { field: &'static str, value: String },
    #[error("{field} contains control characters: {value:?}")]
    Control { field: &'static str, value: String },
}

/// Accept `value` as one key segment, or say why not.
pub fn check_segment(field: &'static str, value: &str) -> Result<(), KeyError> {
    if value.trim().is_empty() {
        return Err(KeyError::Empty(field));
    }
    if value.contains(['/', '\\']) {
        return Err(KeyError::Separator { field, value: s!(value) });
    }
    if value == "." || value == ".." {
        return Err(KeyError::Relative { field, value: s!(value) });
    }
    if value.chars().any(char::is_control) {
        return Err(KeyError::Control { field, value: s!(value) });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_segments_pass() {
        assert_eq!(check_segment("owner", "someone"), Ok(()));
        assert_eq!(check_segment("board", "wall-paper_2024"), Ok(()));
        assert_eq!(check_segment("board", "..hidden"), Ok(()));
    }

    #[test]
    fn traversal_and_garbage_rejected() {
        assert_eq!(check_segment("owner", ""), Err(KeyError::Empty("owner")));
        assert_eq!(check_segment("owner", "  "), Err(KeyError::Empty("owner")));
        assert!(matches!(check_segment("board", ".."), Err(KeyError::Relative { .. })));
        assert!(matches!(check_segment("board", "a/b"), Err(KeyError::Separator { .. })));
        assert!(matches!(check_segment("board", "a\\b"), Err(KeyError::Separator { .. })));
        assert!(matches!(check_segment("board", "a\nb"), Err(KeyError::Control { .. })));
    }
}
