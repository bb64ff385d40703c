//! Visual fragments
//!
//! The output of layout is a tree of fragments. Every fragment is positioned
//! in its parent's space by a [`Transform`]; inside a line the baseline is
//! `y = 0` and x grows rightwards regardless of writing direction.

use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use super::box_model::{Rect, Transform};
use super::words::is_collapsible_space;
use crate::style::{ColorValue, Direction, FontDescriptor};

/// An externally owned visual embedded with `<node id>`.
///
/// Layout only reads its bounds; the visual itself is shared, never owned.
pub trait InlineVisual {
    /// Bounds in the visual's own coordinates.
    fn bounds(&self) -> Rect;
}

/// Identifies a fragment within one layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FragmentId(pub u32);

/// A measured run of styled text.
///
/// Edge whitespace is measured apart from the ink: `leading_space` and
/// `trailing_space` advance the pen but are not part of [`TextLeaf::bounds`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLeaf {
    /// The run, including any edge whitespace that was not collapsed.
    pub text: String,
    /// Writing direction.
    pub direction: Direction,
    /// Font used to measure and render.
    pub font: FontDescriptor,
    /// Fill paint.
    pub fill: ColorValue,
    /// Stroke paint.
    pub stroke: Option<ColorValue>,
    /// Stroke width.
    pub stroke_width: f32,
    /// Width of the text between its edge whitespace.
    pub width: f32,
    /// Height above the baseline.
    pub ascent: f32,
    /// Depth below the baseline.
    pub descent: f32,
    /// Width of the whitespace before the ink (logical start).
    pub leading_space: f32,
    /// Width of the whitespace after the ink (logical end).
    pub trailing_space: f32,
}

impl TextLeaf {
    /// The text without its edge whitespace.
    #[must_use]
    pub fn visible_text(&self) -> &str {
        self.text.trim_matches(is_collapsible_space)
    }

    /// Pen advance: ink plus both edges.
    #[must_use]
    pub fn advance(&self) -> f32 {
        self.leading_space + self.width + self.trailing_space
    }

    /// Ink box. In RTL the logical start is on the right, so the trailing
    /// whitespace sits to the left of the ink.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        let x = if self.direction.is_ltr() {
            self.leading_space
        } else {
            self.trailing_space
        };
        Rect::new(x, -self.ascent, self.width, self.ascent + self.descent)
    }
}

/// An underline or strikethrough.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RuleSegment {
    /// Start x.
    pub x1: f32,
    /// End x.
    pub x2: f32,
    /// Center line y.
    pub y: f32,
    /// Stroke thickness.
    pub thickness: f32,
    /// Stroke paint.
    pub color: ColorValue,
}

impl RuleSegment {
    /// Area covered by the stroked segment.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_edges(
            self.x1,
            self.y - self.thickness / 2.0,
            self.x2,
            self.y + self.thickness / 2.0,
        )
    }
}

/// A `<node>` embed.
#[derive(Clone, Serialize)]
pub struct EmbedFragment {
    /// The id it was looked up by.
    pub id: String,
    /// The shared visual.
    #[serde(skip)]
    pub visual: Rc<dyn InlineVisual>,
    /// The visual's bounds at layout time.
    pub bounds: Rect,
}

impl fmt::Debug for EmbedFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbedFragment")
            .field("id", &self.id)
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

/// Where a link member used to sit before it moved into its link group.
///
/// Keeps the document order of the line tree recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkSlot {
    /// Index into the layout's link groups.
    pub group: usize,
    /// Index into that group's members.
    pub member: usize,
}

/// An ordered group of fragments for one non-text element.
#[derive(Debug, Clone, Serialize)]
pub struct Container {
    /// Writing direction children are placed in.
    pub direction: Direction,
    /// Children in logical order.
    pub children: Vec<Fragment>,
    /// Extra space before the first child.
    pub leading_spacing: f32,
    /// Extra space after the last child.
    pub trailing_spacing: f32,
    /// Pen position for the next child.
    cursor: f32,
}

impl Container {
    /// Empty container with its pen after the leading spacing.
    #[must_use]
    pub fn new(direction: Direction, leading_spacing: f32, trailing_spacing: f32) -> Self {
        let cursor = if direction.is_ltr() {
            leading_spacing
        } else {
            -leading_spacing
        };
        Self {
            direction,
            children: Vec::new(),
            leading_spacing,
            trailing_spacing,
            cursor,
        }
    }

    /// Whether nothing was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Place `child` at the pen and advance past it.
    ///
    /// LTR children grow rightwards from `x = 0`, RTL children leftwards.
    pub fn add(&mut self, mut child: Fragment) {
        let (min, max) = child.outer_extent();
        let advance = max - min;
        if self.direction.is_ltr() {
            child.transform.x += self.cursor - min;
            self.cursor += advance;
        } else {
            child.transform.x += self.cursor - max;
            self.cursor -= advance;
        }
        self.children.push(child);
    }

    /// Add a child that does not take part in horizontal flow.
    pub fn add_decoration(&mut self, child: Fragment) {
        self.children.push(child);
    }

    /// Horizontal span occupied in flow, including spacing.
    #[must_use]
    pub fn extent(&self) -> (f32, f32) {
        if self.direction.is_ltr() {
            (0.0, self.cursor + self.trailing_spacing)
        } else {
            (self.cursor - self.trailing_spacing, 0.0)
        }
    }

    /// Width consumed in flow so far.
    #[must_use]
    pub fn advance(&self) -> f32 {
        let (min, max) = self.extent();
        max - min
    }

    /// Union of the children's bounds at their offsets.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        Rect::union_all(self.children.iter().filter_map(Fragment::bounds))
    }

    /// Remove the descendant with `id`, returning it with its transform
    /// replaced by the absolute one. `parent` is this container's own
    /// absolute transform. The hole is filled with `slot` so the order of
    /// the line can still be walked.
    pub fn detach(&mut self, id: FragmentId, parent: &Transform, slot: LinkSlot) -> Option<Fragment> {
        for index in 0..self.children.len() {
            let absolute = parent.then(&self.children[index].transform);
            if self.children[index].id == id {
                let placeholder = Fragment::new(FragmentKind::LinkSlot(slot));
                let mut detached = std::mem::replace(&mut self.children[index], placeholder);
                detached.transform = absolute;
                return Some(detached);
            }
            if let FragmentKind::Container(inner) = &mut self.children[index].kind
                && let Some(found) = inner.detach(id, &absolute, slot)
            {
                return Some(found);
            }
        }
        None
    }
}

/// What a fragment draws.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FragmentKind {
    /// Styled text.
    Text(TextLeaf),
    /// Grouping for an element.
    Container(Container),
    /// An embedded external visual.
    Embed(EmbedFragment),
    /// Underline or strikethrough.
    Rule(RuleSegment),
    /// Marks a fragment moved into a link group.
    LinkSlot(LinkSlot),
}

/// Bounds and extent a custom tag wrapper is not allowed to change.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Pinned {
    bounds: Option<Rect>,
    extent: (f32, f32),
}

/// A positioned piece of the layout.
#[derive(Debug, Clone, Serialize)]
pub struct Fragment {
    /// Identity within this layout.
    pub id: FragmentId,
    /// Placement in the parent's space.
    pub transform: Transform,
    /// Content.
    #[serde(flatten)]
    pub kind: FragmentKind,
    #[serde(skip)]
    pinned: Option<Pinned>,
}

impl Fragment {
    /// Unplaced fragment with the default id.
    #[must_use]
    pub fn new(kind: FragmentKind) -> Self {
        Self {
            id: FragmentId::default(),
            transform: Transform::IDENTITY,
            kind,
            pinned: None,
        }
    }

    /// Bounds in the fragment's own space.
    #[must_use]
    pub fn local_bounds(&self) -> Option<Rect> {
        if let Some(pinned) = self.pinned {
            return pinned.bounds;
        }
        match &self.kind {
            FragmentKind::Text(leaf) => Some(leaf.bounds()),
            FragmentKind::Container(container) => container.bounds(),
            FragmentKind::Embed(embed) => Some(embed.bounds),
            FragmentKind::Rule(rule) => Some(rule.bounds()),
            FragmentKind::LinkSlot(_) => None,
        }
    }

    /// Bounds in the parent's space.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.local_bounds()
            .map(|bounds| self.transform.apply_rect(&bounds))
    }

    /// Horizontal span taken in flow, in the fragment's own space.
    #[must_use]
    pub fn extent(&self) -> (f32, f32) {
        if let Some(pinned) = self.pinned {
            return pinned.extent;
        }
        match &self.kind {
            FragmentKind::Text(leaf) => (0.0, leaf.advance()),
            FragmentKind::Container(container) => container.extent(),
            FragmentKind::Embed(embed) => (embed.bounds.left(), embed.bounds.right()),
            FragmentKind::Rule(_) | FragmentKind::LinkSlot(_) => (0.0, 0.0),
        }
    }

    /// [`Fragment::extent`] mapped into the parent's space.
    #[must_use]
    pub fn outer_extent(&self) -> (f32, f32) {
        let (min, max) = self.extent();
        let (left, _) = self.transform.apply(min, 0.0);
        let (right, _) = self.transform.apply(max, 0.0);
        (left.min(right), left.max(right))
    }

    /// Keep `bounds` and `extent` (given in the parent's space) as this
    /// fragment's measured geometry whatever its content reports.
    pub(crate) fn pin(&mut self, bounds: Option<Rect>, extent: (f32, f32)) {
        let inverse = self.transform.inverse();
        let (min, _) = inverse.apply(extent.0, 0.0);
        let (max, _) = inverse.apply(extent.1, 0.0);
        self.pinned = Some(Pinned {
            bounds: bounds.map(|bounds| inverse.apply_rect(&bounds)),
            extent: (min.min(max), min.max(max)),
        });
    }

    /// The text leaf, if this is one.
    #[must_use]
    pub const fn as_text(&self) -> Option<&TextLeaf> {
        match &self.kind {
            FragmentKind::Text(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// Direct children; empty for anything but a container.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match &self.kind {
            FragmentKind::Container(container) => &container.children,
            _ => &[],
        }
    }

    /// Depth-first search for the fragment with `id`.
    #[must_use]
    pub fn find(&self, id: FragmentId) -> Option<&Self> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }

    /// Text leaves in document order. Link slots are not followed.
    #[must_use]
    pub fn leaves(&self) -> Vec<&TextLeaf> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a TextLeaf>) {
        match &self.kind {
            FragmentKind::Text(leaf) => out.push(leaf),
            FragmentKind::Container(container) => {
                for child in &container.children {
                    child.collect_leaves(out);
                }
            }
            _ => {}
        }
    }

    /// Concatenated text of every leaf.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.leaves().iter().map(|leaf| leaf.text.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(text: &str, width: f32, trailing_space: f32) -> Fragment {
        Fragment::new(FragmentKind::Text(TextLeaf {
            text: text.to_string(),
            direction: Direction::Ltr,
            font: FontDescriptor::default(),
            fill: ColorValue::BLACK,
            stroke: None,
            stroke_width: 1.0,
            width,
            ascent: 10.0,
            descent: 2.0,
            leading_space: 0.0,
            trailing_space,
        }))
    }

    #[test]
    fn test_ltr_container_places_left_to_right() {
        let mut container = Container::new(Direction::Ltr, 2.0, 1.0);
        container.add(leaf("ab ", 10.0, 5.0));
        container.add(leaf("cd", 10.0, 0.0));
        assert_eq!(container.children[0].transform.x, 2.0);
        assert_eq!(container.children[1].transform.x, 17.0);
        assert_eq!(container.extent(), (0.0, 28.0));
        assert_eq!(container.bounds(), Some(Rect::new(2.0, -10.0, 25.0, 12.0)));
    }

    #[test]
    fn test_rtl_container_places_right_to_left() {
        let mut container = Container::new(Direction::Rtl, 0.0, 0.0);
        container.add(leaf("ab", 10.0, 0.0));
        container.add(leaf("cd", 6.0, 0.0));
        assert_eq!(container.children[0].transform.x, -10.0);
        assert_eq!(container.children[1].transform.x, -16.0);
        assert_eq!(container.extent(), (-16.0, 0.0));
    }

    #[test]
    fn test_scaled_child_advances_by_scaled_extent() {
        let mut inner = Container::new(Direction::Ltr, 0.0, 0.0);
        inner.add(leaf("x", 20.0, 0.0));
        let mut scaled = Fragment::new(FragmentKind::Container(inner));
        scaled.transform.scale = 0.5;
        let mut outer = Container::new(Direction::Ltr, 0.0, 0.0);
        outer.add(leaf("a", 4.0, 0.0));
        outer.add(scaled);
        assert_eq!(outer.advance(), 14.0);
    }

    #[test]
    fn test_detach_reports_absolute_transform() {
        let mut inner = Container::new(Direction::Ltr, 0.0, 0.0);
        let mut target = leaf("x", 5.0, 0.0);
        target.id = FragmentId(7);
        inner.add(leaf("a", 3.0, 0.0));
        inner.add(target);
        let mut wrapper = Fragment::new(FragmentKind::Container(inner));
        wrapper.transform = Transform {
            x: 0.0,
            y: -4.0,
            scale: 0.5,
        };
        let mut line = Container::new(Direction::Ltr, 0.0, 0.0);
        line.add(leaf("lead", 10.0, 0.0));
        line.add(wrapper);

        let slot = LinkSlot { group: 0, member: 0 };
        let line_transform = Transform::translation(0.0, 100.0);
        let detached = line.detach(FragmentId(7), &line_transform, slot).unwrap();
        assert_eq!(detached.transform, Transform {
            x: 11.5,
            y: 96.0,
            scale: 0.5,
        });
        assert!(matches!(
            line.children[1].children()[1].kind,
            FragmentKind::LinkSlot(_)
        ));
        assert!(line.detach(FragmentId(7), &line_transform, slot).is_none());
    }

    #[test]
    fn test_pinned_geometry_survives_content_change() {
        let mut fragment = leaf("abc", 30.0, 0.0);
        fragment.transform.scale = 2.0;
        let original = fragment.bounds();
        fragment.pin(original, (0.0, 60.0));
        if let FragmentKind::Text(text) = &mut fragment.kind {
            text.width = 1.0;
        }
        assert_eq!(fragment.bounds(), original);
        assert_eq!(fragment.outer_extent(), (0.0, 60.0));
    }
}
