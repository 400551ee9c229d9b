use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Legacy placeholder words users type to mean "leave this element out".
/// All of them collapse into [`MediaSource::Suppressed`] at the input
/// boundary; nothing downstream ever compares raw strings again.
const SUPPRESS_WORDS: [&str; 5] = ["/", "kein", "keine", "nichts", "-"];

/// A slot's photo or recipe reference.
///
/// `Suppressed` hides only that one element in the rendered cell; the slot
/// itself stays visible with its name. A slot with no reference at all is
/// `Unset` and renders the default placeholder media paths.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum MediaSource {
    Present(PathBuf),
    Suppressed,
    #[default]
    Unset,
}

impl MediaSource {
    /// Parses a user-entered token. Empty input means "nothing chosen",
    /// any of the placeholder words means "suppress", everything else is
    /// taken as a path (existence is checked at staging time, not here).
    pub fn parse(token: &str) -> Self {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return MediaSource::Unset;
        }
        if SUPPRESS_WORDS
            .iter()
            .any(|w| trimmed.eq_ignore_ascii_case(w))
        {
            return MediaSource::Suppressed;
        }
        MediaSource::Present(PathBuf::from(trimmed))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            MediaSource::Present(path) => Some(path),
            _ => None,
        }
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, MediaSource::Suppressed)
    }
}

impl From<Option<PathBuf>> for MediaSource {
    fn from(value: Option<PathBuf>) -> Self {
        match value {
            Some(path) => MediaSource::Present(path),
            None => MediaSource::Unset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_words_collapse_to_suppressed() {
        for token in ["/", "kein", "KEINE", "nichts", "-", "  Kein  "] {
            assert_eq!(
                MediaSource::parse(token),
                MediaSource::Suppressed,
                "token {token:?}"
            );
        }
    }

    #[test]
    fn empty_input_is_unset() {
        assert_eq!(MediaSource::parse(""), MediaSource::Unset);
        assert_eq!(MediaSource::parse("   "), MediaSource::Unset);
    }

    #[test]
    fn anything_else_is_a_path() {
        assert_eq!(
            MediaSource::parse("/tmp/pizza.jpg"),
            MediaSource::Present(PathBuf::from("/tmp/pizza.jpg"))
        );
    }
}
