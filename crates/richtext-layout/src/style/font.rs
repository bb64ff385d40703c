//! Font descriptors and the CSS `font` shorthand
//!
//! [CSS Fonts Module Level 4](https://www.w3.org/TR/css-fonts-4/)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{StyleError, StyleKey};

/// Font size used when a descriptor's size cannot be resolved to pixels.
pub const DEFAULT_FONT_SIZE_PX: f32 = 16.0;

/// [§ 2.7 `font-stretch`](https://www.w3.org/TR/css-fonts-4/#font-stretch-prop) keywords.
const STRETCH_KEYWORDS: &[&str] = &[
    "ultra-condensed",
    "extra-condensed",
    "condensed",
    "semi-condensed",
    "semi-expanded",
    "expanded",
    "extra-expanded",
    "ultra-expanded",
];

/// A font as a set of CSS longhand values.
///
/// Values are kept as CSS text so they round-trip into whatever font system
/// renders the leaves. Descriptors are never mutated in place by layout; the
/// `with_*` methods return modified copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FontDescriptor {
    /// [§ 3.2 `font-style`](https://www.w3.org/TR/css-fonts-4/#font-style-prop)
    pub style: String,
    /// `normal` or `small-caps`.
    pub variant: String,
    /// [§ 3.2 `font-weight`](https://www.w3.org/TR/css-fonts-4/#font-weight-prop)
    pub weight: String,
    /// [§ 2.7 `font-stretch`](https://www.w3.org/TR/css-fonts-4/#font-stretch-prop)
    pub stretch: String,
    /// [§ 2.5 `font-size`](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
    pub size: String,
    /// [§ 4.2 `line-height`](https://www.w3.org/TR/css-inline-3/#line-height-property)
    pub line_height: String,
    /// [§ 2.1 `font-family`](https://www.w3.org/TR/css-fonts-4/#font-family-prop)
    pub family: String,
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self {
            style: "normal".to_string(),
            variant: "normal".to_string(),
            weight: "normal".to_string(),
            stretch: "normal".to_string(),
            size: "16px".to_string(),
            line_height: "normal".to_string(),
            family: "sans-serif".to_string(),
        }
    }
}

impl FontDescriptor {
    /// [§ 2.8 `font` shorthand](https://www.w3.org/TR/css-fonts-4/#font-prop)
    ///
    /// "[ <font-style> || <font-variant-css2> || <font-weight> || <font-width-css3> ]?
    /// <font-size> [ / <line-height> ]? <font-family>"
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::InvalidFont`] if the size or the family is missing.
    pub fn from_css(text: &str) -> Result<Self, StyleError> {
        let invalid = || StyleError::InvalidFont(text.to_string());
        let mut font = Self::default();
        let mut words = text.split_whitespace();

        // STEP 1: optional style / variant / weight / stretch keywords, any order.
        let size_word = loop {
            let word = words.next().ok_or_else(invalid)?;
            let lower = word.to_ascii_lowercase();
            match lower.as_str() {
                "normal" => {}
                "italic" | "oblique" => font.style = lower,
                "small-caps" => font.variant = lower,
                "bold" | "bolder" | "lighter" => font.weight = lower,
                _ if parse_numeric_weight(&lower).is_some() => font.weight = lower,
                _ if STRETCH_KEYWORDS.contains(&lower.as_str()) => font.stretch = lower,
                _ => break word,
            }
        };

        // STEP 2: <font-size> [ / <line-height> ]?
        let (size, line_height) = match size_word.split_once('/') {
            Some((size, line_height)) => (size, Some(line_height)),
            None => (size_word, None),
        };
        if parse_size_px(size).is_none() {
            return Err(invalid());
        }
        font.size = size.to_string();
        if let Some(line_height) = line_height {
            font.line_height = line_height.to_string();
        }

        // STEP 3: everything left is the family list.
        let family = words.collect::<Vec<_>>().join(" ");
        if family.is_empty() {
            return Err(invalid());
        }
        font.family = family;
        Ok(font)
    }

    /// Serialize back into shorthand form, omitting `normal` keywords.
    #[must_use]
    pub fn to_css(&self) -> String {
        let mut parts: Vec<&str> = [&self.style, &self.variant, &self.weight, &self.stretch]
            .into_iter()
            .map(String::as_str)
            .filter(|value| *value != "normal")
            .collect();
        let size = if self.line_height == "normal" {
            self.size.clone()
        } else {
            format!("{}/{}", self.size, self.line_height)
        };
        parts.push(&size);
        parts.push(&self.family);
        parts.join(" ")
    }

    /// Copy with a different weight (`<b>`, `<strong>`).
    #[must_use]
    pub fn with_weight(&self, weight: &str) -> Self {
        Self {
            weight: weight.to_string(),
            ..self.clone()
        }
    }

    /// Copy with a different style (`<i>`, `<em>`).
    #[must_use]
    pub fn with_style(&self, style: &str) -> Self {
        Self {
            style: style.to_string(),
            ..self.clone()
        }
    }

    /// Copy with one longhand from a `style` attribute applied.
    ///
    /// `key` must be a font longhand; [`StyleKey::Color`] leaves the font unchanged.
    /// A `font-size` in `em` or `%` is resolved against this font's size and
    /// stored in pixels, so nested relative sizes compound.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::InvalidFontSize`] if a `font-size` is not a length.
    pub fn with_longhand(&self, key: StyleKey, value: &str) -> Result<Self, StyleError> {
        let mut font = self.clone();
        let value = value.trim().to_string();
        match key {
            StyleKey::Color => {}
            StyleKey::FontFamily => font.family = value,
            StyleKey::FontSize => {
                let px = parse_size_relative_to(&value, self.size_px())
                    .ok_or(StyleError::InvalidFontSize(value))?;
                font.size = format!("{px}px");
            }
            StyleKey::FontStretch => font.stretch = value,
            StyleKey::FontStyle => font.style = value,
            StyleKey::FontVariant => font.variant = value,
            StyleKey::FontWeight => font.weight = value,
            StyleKey::LineHeight => font.line_height = value,
        }
        Ok(font)
    }

    /// Resolved font size in pixels, falling back to [`DEFAULT_FONT_SIZE_PX`].
    #[must_use]
    pub fn size_px(&self) -> f32 {
        parse_size_px(&self.size).unwrap_or(DEFAULT_FONT_SIZE_PX)
    }

    /// Numeric weight: `normal` is 400, `bold` is 700.
    #[must_use]
    pub fn weight_value(&self) -> u16 {
        match self.weight.as_str() {
            "bold" | "bolder" => 700,
            "lighter" => 300,
            other => parse_numeric_weight(other).unwrap_or(400),
        }
    }

    /// Whether the weight is 600 or heavier.
    #[must_use]
    pub fn is_bold(&self) -> bool {
        self.weight_value() >= 600
    }
}

/// [§ 3.2 `font-weight`](https://www.w3.org/TR/css-fonts-4/#font-weight-prop)
/// Numeric weights from 1 to 1000.
fn parse_numeric_weight(text: &str) -> Option<u16> {
    let weight = text.parse::<u16>().ok()?;
    (1..=1000).contains(&weight).then_some(weight)
}

/// [§ 2.5 `font-size`](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
///
/// Absolute `px`/`pt` lengths, and `em`/`rem`/`%` relative to the default size.
/// A bare number is read as pixels.
fn parse_size_px(text: &str) -> Option<f32> {
    parse_size_relative_to(text, DEFAULT_FONT_SIZE_PX)
}

/// Like [`parse_size_px`], with `em` and `%` relative to `parent_px`.
/// `rem` stays relative to the default size.
fn parse_size_relative_to(text: &str, parent_px: f32) -> Option<f32> {
    let text = text.trim().to_ascii_lowercase();
    let (number, factor) = if let Some(n) = text.strip_suffix("px") {
        (n, 1.0)
    } else if let Some(n) = text.strip_suffix("pt") {
        (n, 4.0 / 3.0)
    } else if let Some(n) = text.strip_suffix("rem") {
        (n, DEFAULT_FONT_SIZE_PX)
    } else if let Some(n) = text.strip_suffix("em") {
        (n, parent_px)
    } else if let Some(n) = text.strip_suffix('%') {
        (n, parent_px / 100.0)
    } else {
        (text.as_str(), 1.0)
    };
    let value = number.trim().parse::<f32>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value * factor)
}

impl fmt::Display for FontDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl FromStr for FontDescriptor {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_css(s)
    }
}

impl TryFrom<String> for FontDescriptor {
    type Error = StyleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_css(&value)
    }
}

impl From<FontDescriptor> for String {
    fn from(value: FontDescriptor) -> Self {
        value.to_css()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorthand_with_keywords() {
        let font = FontDescriptor::from_css("italic small-caps bold 12pt/1.5 \"Open Sans\", serif")
            .unwrap();
        assert_eq!(font.style, "italic");
        assert_eq!(font.variant, "small-caps");
        assert_eq!(font.weight, "bold");
        assert_eq!(font.size, "12pt");
        assert_eq!(font.line_height, "1.5");
        assert_eq!(font.family, "\"Open Sans\", serif");
        assert!((font.size_px() - 16.0).abs() < 1e-4);
    }

    #[test]
    fn test_shorthand_minimal() {
        let font = FontDescriptor::from_css("20px Arial").unwrap();
        assert_eq!(font.weight, "normal");
        assert_eq!(font.size_px(), 20.0);
        assert_eq!(font.to_css(), "20px Arial");
    }

    #[test]
    fn test_numeric_weight_is_a_keyword_not_a_size() {
        let font = FontDescriptor::from_css("300 14px serif").unwrap();
        assert_eq!(font.weight_value(), 300);
        assert_eq!(font.size, "14px");
    }

    #[test]
    fn test_invalid_shorthands() {
        assert!(FontDescriptor::from_css("bold").is_err());
        assert!(FontDescriptor::from_css("16px").is_err());
        assert!(FontDescriptor::from_css("big Arial").is_err());
        assert!(FontDescriptor::from_css("").is_err());
    }

    #[test]
    fn test_copies_do_not_touch_the_original() {
        let base = FontDescriptor::default();
        let bold = base.with_weight("bold");
        let styled = bold.with_longhand(StyleKey::FontSize, " 2em ").unwrap();
        assert_eq!(base.weight, "normal");
        assert!(bold.is_bold());
        assert_eq!(styled.size_px(), 32.0);
        assert_eq!(bold.size, "16px");
        assert_eq!(styled.to_css(), "bold 32px sans-serif");
    }

    #[test]
    fn test_relative_sizes_follow_the_parent() {
        let parent = FontDescriptor::from_css("32px serif").unwrap();
        let half = parent.with_longhand(StyleKey::FontSize, "50%").unwrap();
        assert_eq!(half.size_px(), 16.0);
        assert_eq!(half.size, "16px");

        let double = half.with_longhand(StyleKey::FontSize, "1.5em").unwrap();
        assert_eq!(double.size_px(), 24.0);

        let root = parent.with_longhand(StyleKey::FontSize, "2rem").unwrap();
        assert_eq!(root.size_px(), 32.0);

        let points = parent.with_longhand(StyleKey::FontSize, "12pt").unwrap();
        assert!((points.size_px() - 16.0).abs() < 1e-4);
    }

    #[test]
    fn test_invalid_font_size_is_an_error() {
        let parent = FontDescriptor::default();
        for value in ["banana", "", "-2px", "em"] {
            assert_eq!(
                parent.with_longhand(StyleKey::FontSize, value),
                Err(StyleError::InvalidFontSize(value.to_string()))
            );
        }
    }
}
