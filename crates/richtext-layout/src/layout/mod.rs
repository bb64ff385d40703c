//! Rich-text layout
//!
//! A rebuild runs these stages in order:
//!
//! - [`engine`] - greedy line breaking over the markup tree
//! - [`assembler`] - line lifecycle and vertical stacking
//! - [`links`] - merging the per-line fragments of each link
//! - [`align`] - block alignment
//!
//! Supporting modules:
//!
//! - [`box_model`] - rectangles and transforms
//! - [`fragment`] - the visual fragment tree
//! - [`metrics`] - the text measurement contract
//! - [`words`] - word break candidates

pub mod align;
pub mod assembler;
pub mod box_model;
pub mod engine;
pub mod fragment;
pub mod links;
pub mod metrics;
pub mod words;

use richtext_common::warn_once;
use richtext_markup::{parse, preprocess};
use serde::Serialize;

use self::align::{align_lines, line_bounds};
use self::assembler::{Line, assemble};
use self::box_model::{Rect, Transform};
use self::engine::LineBreakEngine;
use self::fragment::{Fragment, FragmentKind, TextLeaf};
use self::links::{LinkGroup, LinkMember, consolidate};
use self::metrics::FontMetrics;
use crate::error::LayoutError;
use crate::options::{INVALID_MARKUP_TEXT, RichTextOptions, Validation};
use crate::style::StyleContext;

/// The result of one rebuild.
#[derive(Debug, Clone, Serialize)]
pub struct RichTextLayout {
    /// Lines from top to bottom.
    pub lines: Vec<Line>,
    /// Link groups in order of first appearance.
    pub links: Vec<LinkGroup>,
    /// Narrowest width the content wraps to without overflow; only reported
    /// under [`crate::LineWrap::Stretch`].
    pub minimum_width: Option<f32>,
}

impl RichTextLayout {
    /// Bounds of everything laid out, links included.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        Rect::union_all((0..self.lines.len()).filter_map(|index| self.line_bounds(index)))
    }

    /// Bounds of one line, including its link members.
    #[must_use]
    pub fn line_bounds(&self, index: usize) -> Option<Rect> {
        line_bounds(&self.lines, &self.links, index)
    }

    /// Text leaves of one line in order, following link slots.
    #[must_use]
    pub fn line_leaves(&self, index: usize) -> Vec<&TextLeaf> {
        let mut leaves = Vec::new();
        if let Some(line) = self.lines.get(index) {
            for fragment in line.fragments() {
                self.collect_leaves(fragment, &mut leaves);
            }
        }
        leaves
    }

    /// Text leaves of every line in document order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&TextLeaf> {
        (0..self.lines.len())
            .flat_map(|index| self.line_leaves(index))
            .collect()
    }

    /// Text of one line without the whitespace at its ends.
    #[must_use]
    pub fn line_text(&self, index: usize) -> String {
        self.line_leaves(index)
            .iter()
            .map(|leaf| leaf.text.as_str())
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// All text in document order.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.leaves().iter().map(|leaf| leaf.text.as_str()).collect()
    }

    /// Absolute transform and fragment for every top-level fragment and link
    /// member, in document order.
    #[must_use]
    pub fn placed_fragments(&self) -> Vec<(Transform, &Fragment)> {
        let mut placed = Vec::new();
        for line in &self.lines {
            for fragment in line.fragments() {
                match &fragment.kind {
                    FragmentKind::LinkSlot(slot) => {
                        if let Some(member) = self.member(slot.group, slot.member) {
                            placed.push((member.fragment.transform, &member.fragment));
                        }
                    }
                    _ => placed.push((line.transform.then(&fragment.transform), fragment)),
                }
            }
        }
        placed
    }

    fn member(&self, group: usize, member: usize) -> Option<&LinkMember> {
        self.links.get(group)?.members.get(member)
    }

    fn collect_leaves<'a>(&'a self, fragment: &'a Fragment, out: &mut Vec<&'a TextLeaf>) {
        match &fragment.kind {
            FragmentKind::Text(leaf) => out.push(leaf),
            FragmentKind::Container(container) => {
                for child in &container.children {
                    self.collect_leaves(child, out);
                }
            }
            FragmentKind::LinkSlot(slot) => {
                if let Some(member) = self.member(slot.group, slot.member) {
                    self.collect_leaves(&member.fragment, out);
                }
            }
            FragmentKind::Embed(_) | FragmentKind::Rule(_) => {}
        }
    }
}

/// Run a full rebuild of `markup` at `wrap_width`.
///
/// # Errors
///
/// Under [`Validation::Strict`], markup that fails to parse and every
/// validation failure of the engine. Under [`Validation::Lenient`] this
/// only fails if the replacement text itself cannot be laid out.
pub fn build_layout(
    markup: &str,
    options: &RichTextOptions,
    metrics: &dyn FontMetrics,
    wrap_width: f32,
) -> Result<RichTextLayout, LayoutError> {
    let prepared = preprocess(markup, options.replace_newlines);
    let tree = match parse(&prepared) {
        Ok(tree) => tree,
        Err(error) if options.validation == Validation::Lenient => {
            warn_once("RichText", &format!("{error}; showing {INVALID_MARKUP_TEXT:?} instead"));
            parse(INVALID_MARKUP_TEXT)?
        }
        Err(error) => return Err(error.into()),
    };
    log::debug!("laying out {} markup nodes at width {wrap_width}", tree.len());

    let mut engine = LineBreakEngine::new(&tree, options, metrics);
    let style = StyleContext::from_options(options);
    let mut lines = assemble(&mut engine, &style, wrap_width, options.leading)?;
    let output = engine.finish();

    let mut links = consolidate(&mut lines, output.links, &tree, options.link_events_handled);
    align_lines(&mut lines, &mut links, options.align);

    Ok(RichTextLayout {
        lines,
        links,
        minimum_width: output.minimum_width,
    })
}
