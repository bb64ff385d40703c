//! Word break candidates
//!
//! [UAX #14 Unicode Line Breaking Algorithm](https://www.unicode.org/reports/tr14/)
//!
//! A text leaf that overflows its line is shrunk one break range at a time,
//! so ranges must be ordered, non-overlapping, and cover the whole string.

use std::ops::Range;

use unicode_linebreak::linebreaks;

use super::metrics::FontMetrics;
use crate::style::FontDescriptor;

/// Whitespace that may be trimmed at a leaf's edges.
///
/// No-break spaces are content: they keep their width even at a line edge.
#[must_use]
pub fn is_collapsible_space(c: char) -> bool {
    c.is_whitespace() && !matches!(c, '\u{00A0}' | '\u{2007}' | '\u{202F}')
}

/// Split `text` into break ranges.
///
/// Each range ends at a UAX #14 break opportunity and carries its trailing
/// spaces, so `"word1 word2"` yields `"word1 "` and `"word2"`. Leading
/// spaces are folded into the first word rather than forming a range of
/// their own. Empty text yields no ranges.
#[must_use]
pub fn break_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for (end, _opportunity) in linebreaks(text) {
        if end <= start {
            continue;
        }
        // A range of nothing but spaces would place an invisible fragment.
        let blank = text[start..end].chars().all(is_collapsible_space);
        if blank && end < text.len() {
            continue;
        }
        ranges.push(start..end);
        start = end;
    }
    ranges
}

/// Width of the widest unbreakable range, ignoring its trailing spaces.
///
/// This is the narrowest line `text` could be wrapped to without overflow.
#[must_use]
pub fn widest_range_width(text: &str, font: &FontDescriptor, metrics: &dyn FontMetrics) -> f32 {
    break_ranges(text)
        .into_iter()
        .map(|range| metrics.text_width(text[range].trim_matches(is_collapsible_space), font))
        .fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::metrics::ApproximateFontMetrics;

    fn words(text: &str) -> Vec<&str> {
        break_ranges(text).into_iter().map(|range| &text[range]).collect()
    }

    #[test]
    fn test_ranges_keep_trailing_spaces() {
        assert_eq!(words("word1 word2 word3"), vec!["word1 ", "word2 ", "word3"]);
    }

    #[test]
    fn test_leading_space_joins_first_word() {
        assert_eq!(words("  lead  tail "), vec!["  lead  ", "tail "]);
    }

    #[test]
    fn test_no_break_space_holds_words_together() {
        assert_eq!(words("10\u{00A0}kg total"), vec!["10\u{00A0}kg ", "total"]);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(break_ranges("").is_empty());
        assert_eq!(words("   "), vec!["   "]);
        assert_eq!(words("single"), vec!["single"]);
    }

    #[test]
    fn test_widest_range() {
        let font = FontDescriptor::default();
        let width = widest_range_width("a bbb cc", &font, &ApproximateFontMetrics);
        assert!((width - 3.0 * 9.6).abs() < 1e-4);
    }
}
