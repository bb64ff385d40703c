//! The line-break engine
//!
//! [`LineBreakEngine::append_element`] lays out one markup node, and
//! recursively its children, into a container under a width budget. It
//! reports through a [`BreakSignal`] whether the current line ended and
//! whether the node still has content left for the next line.
//!
//! The markup tree is never modified. How far each node has been consumed
//! is kept in a resume cursor: for an element, the number of children
//! finished; for a text node, the byte offset of the first character not yet
//! laid out. Replaying an element after a break therefore continues exactly
//! where the previous line stopped.

use std::str::FromStr;

use richtext_common::warn_once;
use richtext_dom::{ElementData, MarkupTree, NodeId, NodeType};
use strum_macros::{Display, EnumString};

use super::box_model::Rect;
use super::fragment::{Container, EmbedFragment, Fragment, FragmentId, FragmentKind, RuleSegment, TextLeaf};
use super::links::{LinkRecord, LinkTarget};
use super::metrics::FontMetrics;
use super::words::{break_ranges, is_collapsible_space, widest_range_width};
use crate::error::LayoutError;
use crate::options::{LineWrap, LinkPolicy, RichTextOptions, TagWrapper, Validation};
use crate::style::{Direction, StyleContext, parse_style_attribute};

/// Slack allowed when comparing a measured width against a budget.
pub const FIT_EPSILON: f32 = 1e-3;

/// How a call to [`LineBreakEngine::append_element`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BreakSignal {
    /// The node was consumed and the line goes on.
    None,
    /// The line ended at a node boundary; the node was consumed.
    Complete,
    /// The line ended inside the node; lay it out again on the next line.
    Incomplete,
}

/// Per-line placement state, reset whenever a new line starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineState {
    /// Whether anything has been placed on the current line.
    pub has_placed: bool,
}

/// Element kinds the engine treats specially.
#[derive(Debug, Clone, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
enum Tag {
    #[strum(serialize = "a")]
    Anchor,
    #[strum(serialize = "b", serialize = "strong")]
    Bold,
    #[strum(serialize = "i", serialize = "em")]
    Italic,
    #[strum(serialize = "sub")]
    Sub,
    #[strum(serialize = "sup")]
    Sup,
    #[strum(serialize = "u")]
    Underline,
    #[strum(serialize = "s")]
    Strike,
    #[strum(serialize = "span")]
    Span,
    #[strum(serialize = "br")]
    Break,
    #[strum(serialize = "node")]
    NodeEmbed,
    #[strum(default)]
    Generic(String),
}

impl Tag {
    fn of(name: &str) -> Self {
        Self::from_str(name).unwrap_or_else(|_| Self::Generic(name.to_string()))
    }
}

/// Width left on the line, and the accumulated sub/superscript scale it
/// is measured at.
#[derive(Debug, Clone, Copy)]
struct Budget {
    width: f32,
    applied_scale: f32,
}

/// Consumption of every node, indexed by [`NodeId`].
#[derive(Debug, Clone)]
struct ResumeState {
    consumed: Vec<usize>,
}

impl ResumeState {
    fn new(len: usize) -> Self {
        Self {
            consumed: vec![0; len],
        }
    }

    fn get(&self, node: NodeId) -> usize {
        self.consumed.get(node.0).copied().unwrap_or(0)
    }

    fn set(&mut self, node: NodeId, value: usize) {
        if let Some(slot) = self.consumed.get_mut(node.0) {
            *slot = value;
        }
    }
}

/// What the engine collected besides fragments.
#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    /// Every resolved anchor fragment, in layout order.
    pub links: Vec<LinkRecord>,
    /// Widest unbreakable run seen, when stretch wrapping is on.
    pub minimum_width: Option<f32>,
}

/// Greedy line breaker over one parsed markup tree.
pub struct LineBreakEngine<'a> {
    tree: &'a MarkupTree,
    options: &'a RichTextOptions,
    metrics: &'a dyn FontMetrics,
    resume: ResumeState,
    links: Vec<LinkRecord>,
    minimum_width: Option<f32>,
    next_id: u32,
}

impl<'a> LineBreakEngine<'a> {
    /// Engine for a fresh rebuild of `tree`.
    #[must_use]
    pub fn new(tree: &'a MarkupTree, options: &'a RichTextOptions, metrics: &'a dyn FontMetrics) -> Self {
        let minimum_width = matches!(options.line_wrap, LineWrap::Stretch).then_some(0.0);
        Self {
            tree,
            options,
            metrics,
            resume: ResumeState::new(tree.len()),
            links: Vec::new(),
            minimum_width,
            next_id: 0,
        }
    }

    /// The tree being laid out.
    #[must_use]
    pub const fn tree(&self) -> &'a MarkupTree {
        self.tree
    }

    /// Stop laying out and hand over the link records and minimum width.
    #[must_use]
    pub fn finish(self) -> EngineOutput {
        EngineOutput {
            links: self.links,
            minimum_width: self.minimum_width,
        }
    }

    /// An empty leaf in `style`, used to give blank lines their height.
    #[must_use]
    pub fn placeholder(&mut self, style: &StyleContext) -> Fragment {
        let mut fragment = Fragment::new(FragmentKind::Text(self.measure("", style, false)));
        fragment.id = self.allocate_id();
        fragment
    }

    /// Lay out `node` into `container`.
    ///
    /// `width_available` is the budget left on the line in the container's
    /// own units (infinite when wrapping is off). `applied_scale` is the
    /// product of every enclosing sub/superscript scale and only affects the
    /// reported minimum width.
    ///
    /// At most one fragment is added to `container`; an element whose
    /// content could not be placed adds nothing.
    ///
    /// # Errors
    ///
    /// Under [`Validation::Strict`], an unknown style key, a missing embed
    /// or an unresolved link placeholder.
    pub fn append_element(
        &mut self,
        container: &mut Container,
        node: NodeId,
        style: &StyleContext,
        width_available: f32,
        applied_scale: f32,
        line: &mut LineState,
    ) -> Result<BreakSignal, LayoutError> {
        let tree = self.tree;
        let budget = Budget {
            width: width_available,
            applied_scale,
        };
        let signal = match tree.get(node).map(|n| &n.node_type) {
            Some(NodeType::Text(text)) => self.append_text(container, node, text, style, budget, line),
            Some(NodeType::Element(element)) => {
                self.append_markup_element(container, node, element, style, budget, line)?
            }
            Some(NodeType::Root) | None => BreakSignal::None,
        };
        log::trace!("{node:?} -> {signal} (budget {width_available})");
        Ok(signal)
    }

    fn allocate_id(&mut self) -> FragmentId {
        self.next_id += 1;
        FragmentId(self.next_id)
    }

    fn place(&mut self, container: &mut Container, mut fragment: Fragment, line: &mut LineState) {
        fragment.id = self.allocate_id();
        container.add(fragment);
        line.has_placed = true;
    }

    /// Measure `text` as a leaf. At the start of a line its leading
    /// whitespace is dropped.
    fn measure(&self, text: &str, style: &StyleContext, collapse_leading: bool) -> TextLeaf {
        let font = &style.font;
        let ink = text.trim_matches(is_collapsible_space);
        let (text, leading_space, trailing_space) = if ink.is_empty() {
            let text = if collapse_leading { "" } else { text };
            (text, 0.0, self.metrics.text_width(text, font))
        } else {
            let lead_len = text.len() - text.trim_start_matches(is_collapsible_space).len();
            let tail = &text[lead_len + ink.len()..];
            let trailing_space = self.metrics.text_width(tail, font);
            if collapse_leading {
                (&text[lead_len..], 0.0, trailing_space)
            } else {
                let leading_space = self.metrics.text_width(&text[..lead_len], font);
                (text, leading_space, trailing_space)
            }
        };
        TextLeaf {
            text: text.to_string(),
            direction: style.direction,
            font: font.clone(),
            fill: style.fill,
            stroke: style.stroke,
            stroke_width: style.stroke_width,
            width: self.metrics.text_width(ink, font),
            ascent: self.metrics.ascent(font),
            descent: self.metrics.descent(font),
            leading_space,
            trailing_space,
        }
    }

    /// Trailing whitespace never counts against the budget.
    fn fits(leaf: &TextLeaf, width_available: f32) -> bool {
        leaf.leading_space + leaf.width <= width_available + FIT_EPSILON
    }

    fn append_text(
        &mut self,
        container: &mut Container,
        node: NodeId,
        text: &str,
        style: &StyleContext,
        budget: Budget,
        line: &mut LineState,
    ) -> BreakSignal {
        let offset = self.resume.get(node).min(text.len());
        if offset == 0
            && let Some(minimum) = self.minimum_width
        {
            let widest = widest_range_width(text, &style.font, self.metrics) * budget.applied_scale;
            self.minimum_width = Some(minimum.max(widest));
        }
        let content = &text[offset..];

        // Whitespace at the start of a line collapses away entirely.
        let blank = content.chars().all(is_collapsible_space);
        if blank && (!line.has_placed || content.is_empty()) {
            self.resume.set(node, text.len());
            return BreakSignal::None;
        }

        let leaf = self.measure(content, style, !line.has_placed);
        if Self::fits(&leaf, budget.width) {
            self.place(container, Fragment::new(FragmentKind::Text(leaf)), line);
            self.resume.set(node, text.len());
            return BreakSignal::None;
        }

        let ranges = break_ranges(content);
        if ranges.len() <= 1 && !line.has_placed {
            // One unbreakable word on an empty line: overflow rather than
            // leave the line with nothing.
            self.place(container, Fragment::new(FragmentKind::Text(leaf)), line);
            self.resume.set(node, text.len());
            return BreakSignal::Complete;
        }

        // Drop break ranges from the end until the rest fits. The last range
        // standing is forced onto an empty line.
        let mut end = ranges.len().saturating_sub(1);
        while end > 0 {
            let split = ranges[end - 1].end;
            let candidate = self.measure(&content[..split], style, !line.has_placed);
            if Self::fits(&candidate, budget.width) || (end == 1 && !line.has_placed) {
                self.place(container, Fragment::new(FragmentKind::Text(candidate)), line);
                self.resume.set(node, offset + split);
                return BreakSignal::Incomplete;
            }
            end -= 1;
        }
        BreakSignal::Incomplete
    }

    fn append_markup_element(
        &mut self,
        container: &mut Container,
        node: NodeId,
        element: &ElementData,
        style: &StyleContext,
        budget: Budget,
        line: &mut LineState,
    ) -> Result<BreakSignal, LayoutError> {
        let options = self.options;
        let tree = self.tree;
        let tag = Tag::of(&element.tag_name);

        // STEP 1: tags that produce no container.
        match tag {
            Tag::Break => return Ok(BreakSignal::Complete),
            Tag::NodeEmbed => return self.append_embed(container, element, style, budget.width, line),
            _ => {}
        }

        // STEP 2: cascade. Tag defaults first, so an explicit `style`
        // attribute overrides them.
        let mut child_style = style.clone();
        let mut scale = 1.0;
        let mut leading_spacing = 0.0;
        let mut link = None;
        match &tag {
            Tag::Span => {
                if let Some(dir) = element.attr("dir") {
                    match Direction::from_str(dir.trim()) {
                        Ok(direction) => child_style = child_style.with_direction(direction),
                        Err(_) => log::debug!("ignoring span dir `{dir}`"),
                    }
                }
            }
            Tag::Anchor => {
                if let Some(href) = element.attr("href") {
                    link = self.resolve_link(href)?;
                    if link.is_some() {
                        child_style = child_style.with_fill(options.link_fill);
                    }
                }
            }
            Tag::Bold => child_style = child_style.with_font(child_style.font.with_weight("bold")),
            Tag::Italic => child_style = child_style.with_font(child_style.font.with_style("italic")),
            Tag::Sub => {
                scale = usable_scale(options.sub_scale);
                leading_spacing = options.sub_x_spacing / scale;
            }
            Tag::Sup => {
                scale = usable_scale(options.sup_scale);
                leading_spacing = options.sup_x_spacing / scale;
            }
            Tag::Underline | Tag::Strike | Tag::Generic(_) | Tag::Break | Tag::NodeEmbed => {}
        }
        if let Some(css) = element.attr("style") {
            child_style = self.apply_style_attribute(child_style, css)?;
        }

        // STEP 3: children, resuming after the last one finished. Budgets are
        // in this element's unscaled units.
        let mut content = Container::new(child_style.direction, leading_spacing, 0.0);
        let children = tree.children(node);
        let mut next = self.resume.get(node);
        let mut signal = BreakSignal::None;
        while signal == BreakSignal::None && next < children.len() {
            let available = budget.width / scale - content.advance();
            signal = self.append_element(
                &mut content,
                children[next],
                &child_style,
                available,
                budget.applied_scale * scale,
                line,
            )?;
            if signal != BreakSignal::Incomplete {
                next += 1;
            }
        }
        self.resume.set(node, next);
        if signal == BreakSignal::Complete && next < children.len() {
            signal = BreakSignal::Incomplete;
        }

        if content.is_empty() {
            return Ok(signal);
        }

        // STEP 4: per-tag adjustments of the finished fragment.
        match tag {
            Tag::Underline => {
                let height_scale = -options.underline_height_scale;
                self.decorate(&mut content, height_scale, options.underline_line_width, &child_style);
            }
            Tag::Strike => {
                let height_scale = options.strikethrough_height_scale;
                self.decorate(&mut content, height_scale, options.strikethrough_line_width, &child_style);
            }
            _ => {}
        }
        let mut fragment = Fragment::new(FragmentKind::Container(content));
        fragment.transform.scale = scale;
        match tag {
            Tag::Sub => center_vertically(&mut fragment, options.sub_y_offset),
            Tag::Sup => {
                let cap_height = self.metrics.cap_height(&style.font);
                center_vertically(&mut fragment, -cap_height * options.cap_height_scale + options.sup_y_offset);
            }
            _ => {}
        }
        if let Some(wrapper) = options.tags.get(&element.tag_name) {
            fragment = wrap_custom(fragment, wrapper);
        }

        fragment.id = self.allocate_id();
        if let Some(target) = link {
            self.links.push(LinkRecord {
                source: node,
                fragment: fragment.id,
                target,
            });
        }
        container.add(fragment);
        Ok(signal)
    }

    /// `<node id>`: place a shared visual from the node map.
    fn append_embed(
        &mut self,
        container: &mut Container,
        element: &ElementData,
        style: &StyleContext,
        width_available: f32,
        line: &mut LineState,
    ) -> Result<BreakSignal, LayoutError> {
        let id = element.id().unwrap_or_default();
        let Some(visual) = self.options.nodes.get(id).cloned() else {
            self.reject(LayoutError::MissingEmbed(id.to_string()))?;
            return Ok(BreakSignal::None);
        };
        let bounds = visual.bounds();
        if line.has_placed && bounds.width > width_available + FIT_EPSILON {
            return Ok(BreakSignal::Incomplete);
        }

        // Without `align` the visual's own origin sits on the baseline.
        let ascent = self.metrics.ascent(&style.font);
        let descent = self.metrics.descent(&style.font);
        let dy = match element.attr("align").map(str::trim) {
            Some("center") => (descent - ascent) / 2.0 - bounds.center_y(),
            Some("top") => -ascent - bounds.top(),
            Some("bottom") => descent - bounds.bottom(),
            _ => 0.0,
        };
        let mut fragment = Fragment::new(FragmentKind::Embed(EmbedFragment {
            id: id.to_string(),
            visual,
            bounds,
        }));
        fragment.transform.y = dy;
        self.place(container, fragment, line);
        Ok(BreakSignal::None)
    }

    /// Underline or strikethrough across the content's own bounds, at
    /// `height_scale` times its top edge.
    fn decorate(&mut self, content: &mut Container, height_scale: f32, thickness: f32, style: &StyleContext) {
        let Some(bounds) = content.bounds().filter(Rect::is_finite) else {
            return;
        };
        let mut rule = Fragment::new(FragmentKind::Rule(RuleSegment {
            x1: bounds.left(),
            x2: bounds.right(),
            y: height_scale * bounds.top(),
            thickness,
            color: style.fill,
        }));
        rule.id = self.allocate_id();
        content.add_decoration(rule);
    }

    fn apply_style_attribute(&self, mut style: StyleContext, css: &str) -> Result<StyleContext, LayoutError> {
        for declaration in parse_style_attribute(css) {
            match declaration {
                Ok(declaration) => match style.with_declaration(&declaration) {
                    Ok(next) => style = next,
                    Err(error) => self.reject(error.into())?,
                },
                Err(error) => self.reject(error.into())?,
            }
        }
        Ok(style)
    }

    fn resolve_link(&self, href: &str) -> Result<Option<LinkTarget>, LayoutError> {
        match &self.options.links {
            LinkPolicy::Direct => Ok(Some(LinkTarget::Url(href.to_string()))),
            LinkPolicy::Map(map) => {
                if let Some(target) = placeholder_key(href).and_then(|key| map.get(key)) {
                    return Ok(Some(target.clone()));
                }
                self.reject(LayoutError::UnresolvedLink(href.to_string()))?;
                Ok(None)
            }
        }
    }

    /// Fail under strict validation, otherwise warn and carry on.
    fn reject(&self, error: LayoutError) -> Result<(), LayoutError> {
        match self.options.validation {
            Validation::Strict => Err(error),
            Validation::Lenient => {
                warn_once("Layout", &error.to_string());
                Ok(())
            }
        }
    }
}

/// The key inside an exact `{{name}}` placeholder. Anything else is not a
/// placeholder.
fn placeholder_key(href: &str) -> Option<&str> {
    href.strip_prefix("{{")
        .and_then(|rest| rest.strip_suffix("}}"))
}

fn usable_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 { scale } else { 1.0 }
}

/// Move `fragment` so its vertical center is at `center_y`.
fn center_vertically(fragment: &mut Fragment, center_y: f32) {
    if let Some(bounds) = fragment.bounds().filter(Rect::is_finite) {
        fragment.transform.y += center_y - bounds.center_y();
    }
}

/// Run a custom tag wrapper, keeping the original geometry if the wrapper
/// reports different bounds.
fn wrap_custom(fragment: Fragment, wrapper: &TagWrapper) -> Fragment {
    let bounds = fragment.bounds();
    let extent = fragment.outer_extent();
    let mut wrapped = wrapper(fragment);
    if wrapped.bounds() != bounds {
        wrapped.pin(bounds, extent);
    }
    wrapped
}
