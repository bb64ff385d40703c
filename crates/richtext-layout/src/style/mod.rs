//! Style cascade for rich-text layout
//!
//! Every recursion frame of the line-break engine owns a [`StyleContext`]
//! value. Children inherit a modified copy, so a font or fill change inside
//! one element never reaches its later siblings.

/// `style="..."` attribute parsing.
pub mod attribute;
/// Paint values.
pub mod color;
/// Font descriptors and the `font` shorthand.
pub mod font;

use serde::Serialize;
use strum_macros::{Display, EnumString};
use thiserror::Error;

pub use attribute::{Declaration, parse_style_attribute};
pub use color::ColorValue;
pub use font::{DEFAULT_FONT_SIZE_PX, FontDescriptor};

use crate::options::RichTextOptions;

/// Errors raised while reading style values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    /// A `style` attribute named a property outside the supported set.
    #[error("unsupported style key `{0}`")]
    UnknownKey(String),
    /// A declaration without a `:` or without a value.
    #[error("malformed style declaration `{0}`")]
    MalformedDeclaration(String),
    /// A paint value that is not a supported color syntax.
    #[error("invalid color `{0}`")]
    InvalidColor(String),
    /// A `font` shorthand missing its size or family.
    #[error("invalid font shorthand `{0}`")]
    InvalidFont(String),
    /// A `font-size` that is not a non-negative length or percentage.
    #[error("invalid font size `{0}`")]
    InvalidFontSize(String),
}

/// Property names accepted in a `style` attribute.
///
/// `color` sets the fill; everything else is a
/// [CSS font longhand](https://www.w3.org/TR/css-fonts-4/#font-prop).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum StyleKey {
    /// `color`
    Color,
    /// `font-family`
    FontFamily,
    /// `font-size`
    FontSize,
    /// `font-stretch`
    FontStretch,
    /// `font-style`
    FontStyle,
    /// `font-variant`
    FontVariant,
    /// `font-weight`
    FontWeight,
    /// `line-height`
    LineHeight,
}

/// [§ 2.1 Specifying Directionality](https://www.w3.org/TR/css-writing-modes-4/#direction)
///
/// Inline base direction. Set by `<span dir>` and by the explicit
/// embedding marks rewritten before parsing; no bidi reordering is done.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Left to right.
    #[default]
    Ltr,
    /// Right to left.
    Rtl,
}

impl Direction {
    /// Whether inline content advances rightwards.
    #[must_use]
    pub const fn is_ltr(self) -> bool {
        matches!(self, Self::Ltr)
    }
}

/// The style inherited by one recursion frame.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleContext {
    /// Current font.
    pub font: FontDescriptor,
    /// Current fill paint.
    pub fill: ColorValue,
    /// Current stroke paint; `None` draws no outline.
    pub stroke: Option<ColorValue>,
    /// Stroke width in px.
    pub stroke_width: f32,
    /// Current writing direction.
    pub direction: Direction,
}

impl StyleContext {
    /// Root style taken from the configured options.
    #[must_use]
    pub fn from_options(options: &RichTextOptions) -> Self {
        Self {
            font: options.font.clone(),
            fill: options.fill,
            stroke: options.stroke,
            stroke_width: options.stroke_width,
            direction: Direction::Ltr,
        }
    }

    /// Copy with a different direction.
    #[must_use]
    pub fn with_direction(&self, direction: Direction) -> Self {
        Self {
            direction,
            ..self.clone()
        }
    }

    /// Copy with a different fill.
    #[must_use]
    pub fn with_fill(&self, fill: ColorValue) -> Self {
        Self {
            fill,
            ..self.clone()
        }
    }

    /// Copy with a different font.
    #[must_use]
    pub fn with_font(&self, font: FontDescriptor) -> Self {
        Self {
            font,
            ..self.clone()
        }
    }

    /// Copy with one parsed `style` declaration applied.
    ///
    /// # Errors
    ///
    /// Fails when a font longhand cannot be resolved against this context's
    /// font, see [`FontDescriptor::with_longhand`].
    pub fn with_declaration(&self, declaration: &Declaration) -> Result<Self, StyleError> {
        match declaration {
            Declaration::Fill(color) => Ok(self.with_fill(*color)),
            Declaration::Font { key, value } => {
                Ok(self.with_font(self.font.with_longhand(*key, value)?))
            }
        }
    }
}
