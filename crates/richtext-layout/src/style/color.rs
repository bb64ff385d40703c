//! Paint values and parsing
//!
//! [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::StyleError;

/// [§ 4 Color syntax](https://www.w3.org/TR/css-color-4/#color-syntax)
/// sRGB color represented as RGBA components.
///
/// Serialized as its CSS text (`#rrggbb` or `#rrggbbaa`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColorValue {
    /// "the red color channel" (0-255)
    pub r: u8,
    /// "the green color channel" (0-255)
    pub g: u8,
    /// "the blue color channel" (0-255)
    pub b: u8,
    /// "the alpha channel" (0-255, 255 = fully opaque)
    pub a: u8,
}

/// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
///
/// The sixteen basic HTML colors plus their common aliases.
const NAMED_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("black", (0, 0, 0)),
    ("silver", (192, 192, 192)),
    ("gray", (128, 128, 128)),
    ("grey", (128, 128, 128)),
    ("white", (255, 255, 255)),
    ("maroon", (128, 0, 0)),
    ("red", (255, 0, 0)),
    ("purple", (128, 0, 128)),
    ("fuchsia", (255, 0, 255)),
    ("magenta", (255, 0, 255)),
    ("green", (0, 128, 0)),
    ("lime", (0, 255, 0)),
    ("olive", (128, 128, 0)),
    ("yellow", (255, 255, 0)),
    ("navy", (0, 0, 128)),
    ("blue", (0, 0, 255)),
    ("teal", (0, 128, 128)),
    ("aqua", (0, 255, 255)),
    ("cyan", (0, 255, 255)),
];

impl ColorValue {
    /// Black (#000000)
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Default link paint, `rgb(27,0,241)`.
    pub const LINK_BLUE: Self = Self::rgb(27, 0, 241);

    /// Opaque color from its channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// [§ 4.2 The RGB hexadecimal notations](https://www.w3.org/TR/css-color-4/#hex-notation)
    /// "The syntax of a <hex-color> is a <hash-token> token whose value consists of
    /// 3, 4, 6, or 8 hexadecimal digits."
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }
        // Short forms replicate each digit: #abc == #aabbcc.
        let channel = |digits: &str| -> Option<u8> {
            if digits.len() == 1 {
                u8::from_str_radix(&digits.repeat(2), 16).ok()
            } else {
                u8::from_str_radix(digits, 16).ok()
            }
        };
        let step = match hex.len() {
            3 | 4 => 1,
            6 | 8 => 2,
            _ => return None,
        };
        let mut channels = hex
            .as_bytes()
            .chunks(step)
            .map(|chunk| std::str::from_utf8(chunk).ok().and_then(channel));
        let r = channels.next()??;
        let g = channels.next()??;
        let b = channels.next()??;
        let a = channels.next().unwrap_or(Some(255))?;
        Some(Self { r, g, b, a })
    }

    /// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
    #[must_use]
    pub fn from_named(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("transparent") {
            return Some(Self { r: 0, g: 0, b: 0, a: 0 });
        }
        NAMED_COLORS
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|&(_, (r, g, b))| Self::rgb(r, g, b))
    }

    /// [§ 5.1 The RGB functions](https://www.w3.org/TR/css-color-4/#rgb-functions)
    ///
    /// Legacy comma syntax only: `rgb(r, g, b)` and `rgba(r, g, b, alpha)` with
    /// integer channels and an alpha in `0..=1`.
    #[must_use]
    pub fn from_rgb_function(text: &str) -> Option<Self> {
        let lower = text.trim().to_ascii_lowercase();
        let args = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))?
            .strip_suffix(')')?;
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        let channel = |s: &str| s.parse::<u8>().ok();
        match parts.as_slice() {
            [r, g, b] => Some(Self::rgb(channel(r)?, channel(g)?, channel(b)?)),
            [r, g, b, alpha] => {
                let alpha = alpha.parse::<f32>().ok()?;
                if !(0.0..=1.0).contains(&alpha) {
                    return None;
                }
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let a = (alpha * 255.0).round() as u8;
                Some(Self {
                    r: channel(r)?,
                    g: channel(g)?,
                    b: channel(b)?,
                    a,
                })
            }
            _ => None,
        }
    }

    /// Parse any supported notation: hex, `rgb()`/`rgba()`, or a named color.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::InvalidColor`] if no notation matches.
    pub fn parse(text: &str) -> Result<Self, StyleError> {
        let trimmed = text.trim();
        let parsed = if trimmed.starts_with('#') {
            Self::from_hex(trimmed)
        } else if trimmed.contains('(') {
            Self::from_rgb_function(trimmed)
        } else {
            Self::from_named(trimmed)
        };
        parsed.ok_or_else(|| StyleError::InvalidColor(text.to_string()))
    }

    /// Convert to hex string notation (#RRGGBB or #RRGGBBAA if alpha != 255)
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for ColorValue {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_string())
    }
}

impl FromStr for ColorValue {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ColorValue {
    type Error = StyleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ColorValue> for String {
    fn from(value: ColorValue) -> Self {
        value.to_hex_string()
    }
}
