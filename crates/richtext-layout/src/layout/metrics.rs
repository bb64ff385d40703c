//! Text measurement
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//!
//! "CSS assumes that every font has font metrics that specify a
//! characteristic height above the baseline and a depth below it."

use crate::style::FontDescriptor;

/// Measurement contract for styled text runs.
///
/// Layout never shapes glyphs itself; every width and vertical metric comes
/// through this trait. Implementations must be deterministic: the same text
/// and font always measure the same.
pub trait FontMetrics {
    /// Advance width of `text` set in `font`, in px.
    fn text_width(&self, text: &str, font: &FontDescriptor) -> f32;

    /// Distance from the baseline to the top of the em box (positive).
    fn ascent(&self, font: &FontDescriptor) -> f32;

    /// Distance from the baseline to the bottom of the em box (positive).
    fn descent(&self, font: &FontDescriptor) -> f32;

    /// Height of capital letters above the baseline.
    fn cap_height(&self, font: &FontDescriptor) -> f32;
}

/// Approximate font metrics using fixed ratios of the font size.
///
/// Implementation note: Without access to font data, every character
/// advances 0.6× the font size (typical Latin body text in Helvetica/Arial).
/// Bold text is 10% wider so weight changes are visible in measurement.
///
/// This is used by the CLI and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateFontMetrics;

impl ApproximateFontMetrics {
    /// Average advance as a fraction of the font size.
    pub const CHAR_WIDTH_RATIO: f32 = 0.6;
    /// Ascent as a fraction of the font size.
    pub const ASCENT_RATIO: f32 = 0.96;
    /// Descent as a fraction of the font size.
    pub const DESCENT_RATIO: f32 = 0.24;
    /// Cap height as a fraction of the font size.
    pub const CAP_HEIGHT_RATIO: f32 = 0.7;
}

impl FontMetrics for ApproximateFontMetrics {
    fn text_width(&self, text: &str, font: &FontDescriptor) -> f32 {
        let weight_factor = if font.is_bold() { 1.1 } else { 1.0 };
        text.chars().count() as f32 * font.size_px() * Self::CHAR_WIDTH_RATIO * weight_factor
    }

    fn ascent(&self, font: &FontDescriptor) -> f32 {
        font.size_px() * Self::ASCENT_RATIO
    }

    fn descent(&self, font: &FontDescriptor) -> f32 {
        font.size_px() * Self::DESCENT_RATIO
    }

    fn cap_height(&self, font: &FontDescriptor) -> f32 {
        font.size_px() * Self::CAP_HEIGHT_RATIO
    }
}
