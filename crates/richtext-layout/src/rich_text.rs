//! The public rich-text block
//!
//! [`RichText`] owns a source string and a [`RichTextOptions`], and keeps the
//! latest [`RichTextLayout`] of them. Every setter triggers a full,
//! synchronous rebuild; nothing of the previous layout is reused.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::LayoutError;
use crate::layout::fragment::InlineVisual;
use crate::layout::metrics::{ApproximateFontMetrics, FontMetrics};
use crate::layout::{RichTextLayout, build_layout};
use crate::options::{Align, LineWrap, LinkPolicy, RichTextOptions, TagWrapper, Validation};
use crate::style::{ColorValue, FontDescriptor};

#[derive(Debug, Default)]
struct SharedState {
    text: String,
    revision: u64,
}

/// A string several owners can observe and update.
///
/// Each [`SharedString::set`] bumps a revision counter, which is how
/// [`RichText::sync`] notices a change.
#[derive(Debug, Clone, Default)]
pub struct SharedString {
    state: Rc<RefCell<SharedState>>,
}

impl SharedString {
    /// New handle holding `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            state: Rc::new(RefCell::new(SharedState {
                text: text.into(),
                revision: 0,
            })),
        }
    }

    /// Replace the text.
    pub fn set(&self, text: impl Into<String>) {
        let mut state = self.state.borrow_mut();
        state.text = text.into();
        state.revision += 1;
    }

    /// Current text.
    #[must_use]
    pub fn get(&self) -> String {
        self.state.borrow().text.clone()
    }

    /// Number of times the text was replaced.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.state.borrow().revision
    }
}

/// Where the markup comes from.
#[derive(Debug, Clone)]
pub enum TextSource {
    /// A fixed string.
    Literal(String),
    /// A string that may change behind the block's back.
    Shared(SharedString),
}

impl TextSource {
    /// Current markup.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Literal(text) => text.clone(),
            Self::Shared(shared) => shared.get(),
        }
    }

    fn revision(&self) -> u64 {
        match self {
            Self::Literal(_) => 0,
            Self::Shared(shared) => shared.revision(),
        }
    }
}

impl From<&str> for TextSource {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<String> for TextSource {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl From<SharedString> for TextSource {
    fn from(value: SharedString) -> Self {
        Self::Shared(value)
    }
}

fn wrap_width_for(line_wrap: LineWrap, preferred_width: Option<f32>) -> f32 {
    match line_wrap {
        LineWrap::None => f32::INFINITY,
        LineWrap::Fixed(width) => width,
        LineWrap::Stretch => preferred_width.unwrap_or(f32::INFINITY),
    }
}

/// Generates option setters that rebuild.
macro_rules! rebuilding_setters {
    ($($(#[$doc:meta])* $name:ident => $field:ident: $ty:ty;)*) => {
        $(
            $(#[$doc])*
            ///
            /// # Errors
            ///
            /// Returns the rebuild failure; the previous layout is kept.
            pub fn $name(&mut self, value: $ty) -> Result<(), LayoutError> {
                self.options.$field = value;
                self.rebuild()
            }
        )*
    };
}

/// A block of rich text and its current layout.
pub struct RichText {
    source: TextSource,
    options: RichTextOptions,
    metrics: Rc<dyn FontMetrics>,
    preferred_width: Option<f32>,
    layout: RichTextLayout,
    revision: u64,
}

impl RichText {
    /// Lay out `source` with approximate font metrics.
    ///
    /// # Errors
    ///
    /// Returns the first layout failure under strict validation.
    pub fn new(source: impl Into<TextSource>, options: RichTextOptions) -> Result<Self, LayoutError> {
        Self::with_metrics(source, options, Rc::new(ApproximateFontMetrics))
    }

    /// Lay out `source` measuring text with `metrics`.
    ///
    /// # Errors
    ///
    /// Returns the first layout failure under strict validation.
    pub fn with_metrics(
        source: impl Into<TextSource>,
        options: RichTextOptions,
        metrics: Rc<dyn FontMetrics>,
    ) -> Result<Self, LayoutError> {
        let source = source.into();
        let revision = source.revision();
        let wrap_width = wrap_width_for(options.line_wrap, None);
        let layout = build_layout(&source.text(), &options, metrics.as_ref(), wrap_width)?;
        Ok(Self {
            source,
            options,
            metrics,
            preferred_width: None,
            layout,
            revision,
        })
    }

    /// The current layout.
    #[must_use]
    pub const fn layout(&self) -> &RichTextLayout {
        &self.layout
    }

    /// The current options.
    #[must_use]
    pub const fn options(&self) -> &RichTextOptions {
        &self.options
    }

    /// The current markup.
    #[must_use]
    pub fn source_text(&self) -> String {
        self.source.text()
    }

    /// Width lines wrap at for the current options.
    #[must_use]
    pub fn wrap_width(&self) -> f32 {
        wrap_width_for(self.options.line_wrap, self.preferred_width)
    }

    /// Lay everything out again from the source.
    ///
    /// # Errors
    ///
    /// Returns the first layout failure under strict validation; the
    /// previous layout is kept.
    pub fn rebuild(&mut self) -> Result<(), LayoutError> {
        let layout = build_layout(
            &self.source.text(),
            &self.options,
            self.metrics.as_ref(),
            self.wrap_width(),
        )?;
        self.layout = layout;
        self.revision = self.source.revision();
        Ok(())
    }

    /// Rebuild if a shared source string changed since the last rebuild.
    /// Returns whether a rebuild happened.
    ///
    /// # Errors
    ///
    /// Returns the rebuild failure.
    pub fn sync(&mut self) -> Result<bool, LayoutError> {
        if self.source.revision() == self.revision {
            return Ok(false);
        }
        self.rebuild()?;
        Ok(true)
    }

    /// Replace the markup source.
    ///
    /// # Errors
    ///
    /// Returns the rebuild failure; the previous layout is kept.
    pub fn set_string(&mut self, source: impl Into<TextSource>) -> Result<(), LayoutError> {
        self.source = source.into();
        self.rebuild()
    }

    /// Replace every option at once.
    ///
    /// # Errors
    ///
    /// Returns the rebuild failure; the previous layout is kept.
    pub fn set_options(&mut self, options: RichTextOptions) -> Result<(), LayoutError> {
        self.options = options;
        self.rebuild()
    }

    /// Width offered by the host, used under [`LineWrap::Stretch`]. Only
    /// rebuilds in that mode.
    ///
    /// # Errors
    ///
    /// Returns the rebuild failure.
    pub fn set_preferred_width(&mut self, width: Option<f32>) -> Result<(), LayoutError> {
        if self.preferred_width == width {
            return Ok(());
        }
        self.preferred_width = width;
        if matches!(self.options.line_wrap, LineWrap::Stretch) {
            self.rebuild()?;
        }
        Ok(())
    }

    rebuilding_setters! {
        /// Base font.
        set_font => font: FontDescriptor;
        /// Base fill.
        set_fill => fill: ColorValue;
        /// Base stroke.
        set_stroke => stroke: Option<ColorValue>;
        /// Stroke width.
        set_stroke_width => stroke_width: f32;
        /// Subscript scale.
        set_sub_scale => sub_scale: f32;
        /// Gap before subscripts.
        set_sub_x_spacing => sub_x_spacing: f32;
        /// Subscript vertical offset.
        set_sub_y_offset => sub_y_offset: f32;
        /// Superscript scale.
        set_sup_scale => sup_scale: f32;
        /// Gap before superscripts.
        set_sup_x_spacing => sup_x_spacing: f32;
        /// Superscript vertical offset.
        set_sup_y_offset => sup_y_offset: f32;
        /// Cap-height fraction superscripts center on.
        set_cap_height_scale => cap_height_scale: f32;
        /// Underline thickness.
        set_underline_line_width => underline_line_width: f32;
        /// Underline position.
        set_underline_height_scale => underline_height_scale: f32;
        /// Strikethrough thickness.
        set_strikethrough_line_width => strikethrough_line_width: f32;
        /// Strikethrough position.
        set_strikethrough_height_scale => strikethrough_height_scale: f32;
        /// Fill of links.
        set_link_fill => link_fill: ColorValue;
        /// Whether link events are marked handled.
        set_link_events_handled => link_events_handled: bool;
        /// Allowed link targets.
        set_links => links: LinkPolicy;
        /// Visuals for `<node id>`.
        set_nodes => nodes: HashMap<String, Rc<dyn InlineVisual>>;
        /// Custom tag wrappers.
        set_tags => tags: HashMap<String, TagWrapper>;
        /// Whether `\n` becomes a line break.
        set_replace_newlines => replace_newlines: bool;
        /// Line alignment.
        set_align => align: Align;
        /// Space between lines.
        set_leading => leading: f32;
        /// Wrapping mode.
        set_line_wrap => line_wrap: LineWrap;
        /// Failure policy.
        set_validation => validation: Validation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_rebuild() {
        let mut rich_text = RichText::new("one two three", RichTextOptions::default()).unwrap();
        assert_eq!(rich_text.layout().lines.len(), 1);
        rich_text.set_line_wrap(LineWrap::Fixed(60.0)).unwrap();
        assert_eq!(rich_text.layout().lines.len(), 3);
        rich_text.set_string("one").unwrap();
        assert_eq!(rich_text.layout().lines.len(), 1);
    }

    #[test]
    fn test_failed_rebuild_keeps_previous_layout() {
        let options = RichTextOptions {
            validation: Validation::Strict,
            ..RichTextOptions::default()
        };
        let mut rich_text = RichText::new("fine", options).unwrap();
        let error = rich_text.set_string("<b style=\"margin: 0\">x</b>").unwrap_err();
        assert!(matches!(error, LayoutError::Style(_)));
        assert_eq!(rich_text.layout().text_content(), "fine");
    }

    #[test]
    fn test_shared_string_sync() {
        let shared = SharedString::new("before");
        let mut rich_text = RichText::new(shared.clone(), RichTextOptions::default()).unwrap();
        assert!(!rich_text.sync().unwrap());
        shared.set("after");
        assert!(rich_text.sync().unwrap());
        assert_eq!(rich_text.layout().text_content(), "after");
        assert!(!rich_text.sync().unwrap());
    }

    #[test]
    fn test_preferred_width_only_matters_when_stretching() {
        let mut rich_text = RichText::new("aaa bbb", RichTextOptions::default()).unwrap();
        rich_text.set_preferred_width(Some(40.0)).unwrap();
        assert_eq!(rich_text.layout().lines.len(), 1);
        rich_text.set_line_wrap(LineWrap::Stretch).unwrap();
        assert_eq!(rich_text.layout().lines.len(), 2);
        assert!((rich_text.layout().minimum_width.unwrap() - 3.0 * 9.6).abs() < 1e-4);
    }
}
