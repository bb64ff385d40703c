//! Rich-text layout engine
//!
//! Turns a string in a small markup dialect into positioned lines of
//! styled text runs, embedded visuals and link groups, ready for an external
//! 2D renderer.
//!
//! # Pipeline
//!
//! 1. `\n` and explicit embedding marks are rewritten ([`richtext_markup::preprocess`])
//! 2. The markup is parsed into a [`richtext_dom::MarkupTree`]
//! 3. [`layout::engine::LineBreakEngine`] packs the tree into lines greedily
//! 4. [`layout::links::consolidate`] merges each link's per-line fragments
//! 5. [`layout::align::align_lines`] aligns the lines in the block
//!
//! [`RichText`] runs all of it whenever a property changes.
//!
//! # Markup
//!
//! `<a href>`, `<b>`/`<strong>`, `<i>`/`<em>`, `<sub>`, `<sup>`, `<u>`, `<s>`,
//! `<span dir>`, `<br>`, `<node id align>` and any tag registered in
//! [`RichTextOptions::tags`]. Every element accepts a `style` attribute
//! limited to `color` and the CSS font longhands.

/// Rebuild errors.
pub mod error;
/// Layout stages and the fragment model.
pub mod layout;
/// Configuration.
pub mod options;
/// The public rich-text block.
pub mod rich_text;
/// Style values and cascade.
pub mod style;

pub use error::LayoutError;
pub use layout::assembler::Line;
pub use layout::box_model::{Rect, Transform};
pub use layout::engine::{BreakSignal, LineBreakEngine, LineState};
pub use layout::fragment::{
    Container, EmbedFragment, Fragment, FragmentId, FragmentKind, InlineVisual, RuleSegment, TextLeaf,
};
pub use layout::links::{LinkGroup, LinkMember, LinkTarget};
pub use layout::metrics::{ApproximateFontMetrics, FontMetrics};
pub use layout::{RichTextLayout, build_layout};
pub use options::{Align, LineWrap, LinkPolicy, RichTextOptions, TagWrapper, Validation};
pub use rich_text::{RichText, SharedString, TextSource};
pub use style::{ColorValue, Direction, FontDescriptor, StyleContext, StyleError};
