//! Character reference decoding for text and attribute values.
//!
//! Only the references that show up in translated UI strings are named:
//! `amp`, `lt`, `gt`, `quot`, `apos` and `nbsp`. Numeric references in decimal
//! (`&#169;`) and hex (`&#xA9;`) form are decoded in full. A reference that
//! cannot be decoded is left in the text literally.

/// Named references recognised by [`decode`].
const NAMED: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{00A0}'),
];

/// Decode the reference at the start of `input`, which must begin with `&`.
///
/// Returns the decoded character and the number of bytes consumed (including
/// the `&` and the terminating `;`), or `None` if `input` does not start with a
/// complete, known reference.
#[must_use]
pub fn decode(input: &str) -> Option<(char, usize)> {
    let body = input.strip_prefix('&')?;
    let end = body.find(';')?;
    let name = &body[..end];
    let consumed = end + 2;

    if let Some(numeric) = name.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        // NUL and surrogates decode to U+FFFD like HTML does.
        let ch = match code {
            0 => '\u{FFFD}',
            _ => char::from_u32(code).unwrap_or('\u{FFFD}'),
        };
        return Some((ch, consumed));
    }

    NAMED
        .iter()
        .find(|(known, _)| *known == name)
        .map(|&(_, ch)| (ch, consumed))
}
