//! Source rewrites applied before tokenizing.
//!
//! Translators write direction changes with the Unicode embedding controls
//! rather than markup, and UI strings often carry raw newlines. Both are turned
//! into the equivalent tags so the layout engine only has to understand
//! `<span dir>` and `<br>`.

/// LEFT-TO-RIGHT EMBEDDING, opens an LTR span.
pub const LRE: char = '\u{202A}';
/// RIGHT-TO-LEFT EMBEDDING, opens an RTL span.
pub const RLE: char = '\u{202B}';
/// POP DIRECTIONAL FORMATTING, closes the innermost span.
pub const PDF: char = '\u{202C}';

/// Rewrite directional embedding marks into `<span dir="...">` pairs and,
/// when `replace_newlines` is set, every `\n` into `<br>`.
#[must_use]
pub fn preprocess(text: &str, replace_newlines: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            LRE => out.push_str("<span dir=\"ltr\">"),
            RLE => out.push_str("<span dir=\"rtl\">"),
            PDF => out.push_str("</span>"),
            '\n' if replace_newlines => out.push_str("<br>"),
            _ => out.push(ch),
        }
    }
    out
}
