use std::ops::RangeInclusive;

use serde::Serialize;

use crate::pipeline::{FileRecord, decode_text};

/// Number of leading characters inspected by [`is_previewable`].
pub const PREVIEW_WINDOW: usize = 100;

/// Non-Latin scripts accepted besides printable ASCII.
const PRINTABLE_SCRIPTS: &[RangeInclusive<char>] = &[
    // Hebrew letters
    '\u{05D0}'..='\u{05EA}',
];

fn is_printable(c: char) -> bool {
    c.is_whitespace()
        || c == '\u{FEFF}'
        || ('!'..='~').contains(&c)
        || PRINTABLE_SCRIPTS.iter().any(|r| r.contains(&c))
}

/// True when the first [`PREVIEW_WINDOW`] characters all look like text.
/// An empty string qualifies.
pub fn is_previewable(text: &str) -> bool {
    text.chars().take(PREVIEW_WINDOW).all(is_printable)
}

/// Side-by-side text of a previewable record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub original: String,
    /// Lenient decode, i.e. what the file looks like without correction.
    pub corrupted: String,
}

impl Preview {
    pub fn of(record: &FileRecord) -> Option<Self> {
        if !is_previewable(record.text()) {
            return None;
        }
        Some(Self {
            original: record.text().to_owned(),
            corrupted: decode_text(record.decoded_unfixed()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_previewable() {
        assert!(is_previewable(""));
    }

    #[test]
    fn ascii_and_whitespace() {
        assert!(is_previewable("fn main() {\n\tprintln!(\"hi\");\r\n}"));
        assert!(is_previewable(&"~".repeat(100)));
    }

    #[test]
    fn hebrew_letters() {
        assert!(is_previewable("שלום עולם"));
    }

    #[test]
    fn control_characters_reject() {
        assert!(!is_previewable("abc\u{0}def"));
        assert!(!is_previewable("\u{7f}"));
        assert!(!is_previewable("bell\u{7}"));
    }

    #[test]
    fn replacement_character_rejects() {
        assert!(!is_previewable("PNG\u{fffd}\u{fffd}"));
    }

    #[test]
    fn other_scripts_reject() {
        assert!(!is_previewable("café"));
        assert!(!is_previewable("Привет"));
    }

    #[test]
    fn only_first_hundred_characters_count() {
        let mut text = "a".repeat(PREVIEW_WINDOW);
        text.push('\u{0}');
        assert!(is_previewable(&text));

        let mut text = "a".repeat(PREVIEW_WINDOW - 1);
        text.push('\u{0}');
        assert!(!is_previewable(&text));
    }

    #[test]
    fn window_counts_characters_not_bytes() {
        let mut text = "ש".repeat(PREVIEW_WINDOW);
        text.push('\u{1}');
        assert!(is_previewable(&text));
    }
}
