//! Inline formatting tests: style cascade, decorations, sub/superscripts,
//! embedded visuals, custom tags and text direction.

use std::rc::Rc;

use richtext_layout::{
    ColorValue, Container, Direction, Fragment, FragmentKind, InlineVisual, LayoutError, Rect,
    RichText, RichTextLayout, RichTextOptions, RuleSegment, StyleError, TagWrapper, Validation,
};

const CHAR: f32 = 9.6;
const ASCENT: f32 = 15.36;
const DESCENT: f32 = 3.84;

fn strict() -> RichTextOptions {
    RichTextOptions {
        validation: Validation::Strict,
        ..RichTextOptions::default()
    }
}

fn layout_of(markup: &str, options: RichTextOptions) -> RichTextLayout {
    RichText::new(markup, options).unwrap().layout().clone()
}

/// Absolute bounds of the `index`-th top-level fragment across all lines.
fn placed_bounds(layout: &RichTextLayout, index: usize) -> Rect {
    let (transform, fragment) = layout.placed_fragments()[index];
    transform.apply_rect(&fragment.local_bounds().unwrap())
}

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "expected {expected}, got {actual}"
    );
}

/// A square standing on its origin.
struct Square(f32);

impl InlineVisual for Square {
    fn bounds(&self) -> Rect {
        Rect::new(0.0, -self.0, self.0, self.0)
    }
}

// ---------------------------------------------------------------------------
// Style cascade
// ---------------------------------------------------------------------------

#[test]
fn test_style_attribute_applies_to_descendants_only() {
    let layout = layout_of(
        "<span style=\"color: red; font-size: 32px\">x</span>y",
        strict(),
    );
    let leaves = layout.leaves();
    assert_eq!(leaves[0].fill, ColorValue::rgb(255, 0, 0));
    assert_close(leaves[0].font.size_px(), 32.0);
    assert_close(leaves[0].width, 2.0 * CHAR);
    assert_eq!(leaves[1].fill, ColorValue::BLACK);
    assert_close(leaves[1].font.size_px(), 16.0);
}

#[test]
fn test_bold_and_italic() {
    let layout = layout_of("<b>x</b><strong>y</strong><i>z</i><em>w</em>", strict());
    let leaves = layout.leaves();
    assert!(leaves[0].font.is_bold());
    assert!(leaves[1].font.is_bold());
    assert_close(leaves[0].width, CHAR * 1.1);
    assert_eq!(leaves[2].font.style, "italic");
    assert_eq!(leaves[3].font.style, "italic");
    assert!(!leaves[3].font.is_bold());
}

#[test]
fn test_style_attribute_overrides_tag_default() {
    let layout = layout_of("<b style=\"font-weight: normal\">x</b>", strict());
    assert!(!layout.leaves()[0].font.is_bold());
}

#[test]
fn test_sibling_styles_do_not_leak() {
    let layout = layout_of("<b>x</b>y<span style=\"color: #00ff00\">z</span>w", strict());
    let leaves = layout.leaves();
    assert!(!leaves[1].font.is_bold());
    assert_eq!(leaves[2].fill, ColorValue::rgb(0, 255, 0));
    assert_eq!(leaves[3].fill, ColorValue::BLACK);
}

#[test]
fn test_stroke_reaches_leaves() {
    let options = RichTextOptions {
        stroke: Some(ColorValue::rgb(255, 0, 0)),
        stroke_width: 2.0,
        ..strict()
    };
    let layout = layout_of("x", options);
    assert_eq!(layout.leaves()[0].stroke, Some(ColorValue::rgb(255, 0, 0)));
    assert_close(layout.leaves()[0].stroke_width, 2.0);
}

#[test]
fn test_unknown_style_key_strict_vs_lenient() {
    let error = RichText::new("<span style=\"margin: 0; color: red\">x</span>", strict())
        .err()
        .unwrap();
    assert!(matches!(error, LayoutError::Style(StyleError::UnknownKey(_))));

    let options = RichTextOptions {
        validation: Validation::Lenient,
        ..RichTextOptions::default()
    };
    let layout = layout_of("<span style=\"margin: 0; color: red\">x</span>", options);
    assert_eq!(layout.leaves()[0].fill, ColorValue::rgb(255, 0, 0));
}

#[test]
fn test_invalid_color_is_a_style_error() {
    let error = RichText::new("<span style=\"color: nope\">x</span>", strict())
        .err()
        .unwrap();
    assert!(matches!(error, LayoutError::Style(_)));
}

#[test]
fn test_font_from_options() {
    let options = RichTextOptions {
        font: "bold 20px serif".parse().unwrap(),
        ..strict()
    };
    let layout = layout_of("ab", options);
    let leaf = layout.leaves()[0];
    assert!(leaf.font.is_bold());
    assert_close(leaf.width, 2.0 * 0.6 * 20.0 * 1.1);
}

#[test]
fn test_relative_font_size_uses_the_parent_size() {
    let layout = layout_of(
        "<span style=\"font-size: 32px\">x<span style=\"font-size: 50%\">ab</span></span>",
        strict(),
    );
    let leaves = layout.leaves();
    assert_close(leaves[0].font.size_px(), 32.0);
    assert_close(leaves[1].font.size_px(), 16.0);
    assert_close(leaves[1].width, 2.0 * 0.6 * 16.0);

    let options = RichTextOptions {
        font: "20px serif".parse().unwrap(),
        ..strict()
    };
    let layout = layout_of("<span style=\"font-size: 2em\">a</span>", options);
    assert_close(layout.leaves()[0].font.size_px(), 40.0);
    assert_close(layout.leaves()[0].width, 0.6 * 40.0);
}

#[test]
fn test_invalid_font_size_strict_vs_lenient() {
    let markup = "<span style=\"font-size: 20px\">a<span style=\"font-size: banana\">b</span></span>";
    let error = RichText::new(markup, strict()).err().unwrap();
    assert_eq!(
        error,
        LayoutError::Style(StyleError::InvalidFontSize("banana".to_string()))
    );

    let options = RichTextOptions {
        validation: Validation::Lenient,
        ..RichTextOptions::default()
    };
    let layout = layout_of(markup, options);
    assert_close(layout.leaves()[1].font.size_px(), 20.0);
}

// ---------------------------------------------------------------------------
// Decorations
// ---------------------------------------------------------------------------

fn rule_of(fragment: &Fragment) -> RuleSegment {
    fragment
        .children()
        .iter()
        .find_map(|child| match &child.kind {
            FragmentKind::Rule(rule) => Some(*rule),
            _ => None,
        })
        .unwrap()
}

#[test]
fn test_underline_sits_below_baseline() {
    let layout = layout_of("<u>ab</u>", strict());
    let (_, fragment) = layout.placed_fragments()[0];
    let rule = rule_of(fragment);
    assert_close(rule.x1, 0.0);
    assert_close(rule.x2, 2.0 * CHAR);
    assert_close(rule.y, 0.15 * ASCENT);
    assert_close(rule.thickness, 1.0);
    assert_eq!(rule.color, ColorValue::BLACK);
}

#[test]
fn test_strikethrough_follows_fill() {
    let options = RichTextOptions {
        strikethrough_line_width: 2.0,
        ..strict()
    };
    let layout = layout_of("<s style=\"color: blue\">ab</s>", options);
    let (_, fragment) = layout.placed_fragments()[0];
    let rule = rule_of(fragment);
    assert_close(rule.y, -0.3 * ASCENT);
    assert_close(rule.thickness, 2.0);
    assert_eq!(rule.color, ColorValue::rgb(0, 0, 255));
}

#[test]
fn test_decoration_does_not_advance_the_line() {
    let layout = layout_of("<u>ab</u>cd", strict());
    assert_close(placed_bounds(&layout, 1).left(), 2.0 * CHAR);
}

// ---------------------------------------------------------------------------
// Sub and superscripts
// ---------------------------------------------------------------------------

#[test]
fn test_sup_centers_on_cap_height() {
    let layout = layout_of("x<sup>2</sup>", strict());
    let bounds = placed_bounds(&layout, 1);
    // Cap height is 0.7 of the 16px size.
    assert_close(bounds.center_y(), -0.7 * 16.0 * 0.75);
    assert_close(bounds.left(), CHAR);
}

#[test]
fn test_sub_offset_and_spacing() {
    let options = RichTextOptions {
        sub_x_spacing: 5.0,
        sub_y_offset: 2.0,
        ..strict()
    };
    let layout = layout_of("a<sub>b</sub>c", options);
    let sub = placed_bounds(&layout, 1);
    assert_close(sub.center_y(), 2.0);
    assert_close(sub.left(), CHAR + 5.0);
    assert_close(placed_bounds(&layout, 2).left(), CHAR + 5.0 + 0.75 * CHAR);
}

#[test]
fn test_nested_scripts_multiply_scale() {
    let layout = layout_of("<sup>a<sup>b</sup></sup>", strict());
    let (_, outer) = layout.placed_fragments()[0];
    let inner = &outer.children()[1];
    assert_close(outer.transform.scale, 0.75);
    assert_close(inner.transform.scale, 0.75);
}

// ---------------------------------------------------------------------------
// Embedded visuals
// ---------------------------------------------------------------------------

fn with_square(size: f32) -> RichTextOptions {
    let mut options = strict();
    options.insert_node("sq", Rc::new(Square(size)));
    options
}

#[test]
fn test_embed_sits_on_baseline_by_default() {
    let layout = layout_of("x<node id=\"sq\"/>", with_square(20.0));
    let bounds = placed_bounds(&layout, 1);
    assert_close(bounds.left(), CHAR);
    assert_close(bounds.bottom(), 0.0);
    assert_close(bounds.width, 20.0);
}

#[test]
fn test_embed_alignment() {
    let center = layout_of("<node id=\"sq\" align=\"center\"/>", with_square(20.0));
    assert_close(placed_bounds(&center, 0).center_y(), (DESCENT - ASCENT) / 2.0);

    let top = layout_of("<node id=\"sq\" align=\"top\"/>", with_square(20.0));
    assert_close(placed_bounds(&top, 0).top(), -ASCENT);

    let bottom = layout_of("<node id=\"sq\" align=\"bottom\"/>", with_square(20.0));
    assert_close(placed_bounds(&bottom, 0).bottom(), DESCENT);
}

#[test]
fn test_embed_wraps_to_next_line() {
    let options = RichTextOptions {
        line_wrap: richtext_layout::LineWrap::Fixed(40.0),
        ..with_square(20.0)
    };
    let layout = layout_of("abc<node id=\"sq\"/>", options);
    assert_eq!(layout.lines.len(), 2);
    assert!(matches!(
        layout.lines[1].fragments()[0].kind,
        FragmentKind::Embed(_)
    ));
}

#[test]
fn test_oversized_embed_is_forced_onto_empty_line() {
    let options = RichTextOptions {
        line_wrap: richtext_layout::LineWrap::Fixed(10.0),
        ..with_square(20.0)
    };
    let layout = layout_of("<node id=\"sq\"/>", options);
    assert_eq!(layout.lines.len(), 1);
    assert_close(layout.bounds().unwrap().width, 20.0);
}

// ---------------------------------------------------------------------------
// Custom tags
// ---------------------------------------------------------------------------

#[test]
fn test_custom_tag_keeps_original_geometry() {
    let wrapper: TagWrapper = Rc::new(|fragment: Fragment| {
        let mut outer = Container::new(Direction::Ltr, 0.0, 0.0);
        outer.add_decoration(fragment);
        outer.add_decoration(Fragment::new(FragmentKind::Rule(RuleSegment {
            x1: -50.0,
            x2: 500.0,
            y: 0.0,
            thickness: 40.0,
            color: ColorValue::BLACK,
        })));
        Fragment::new(FragmentKind::Container(outer))
    });
    let mut options = strict();
    options.insert_tag("HL", wrapper);

    let layout = layout_of("<hl>ab</hl> cd", options);
    assert_eq!(layout.text_content(), "ab cd");
    let highlighted = placed_bounds(&layout, 0);
    assert_close(highlighted.left(), 0.0);
    assert_close(highlighted.width, 2.0 * CHAR);
    assert_close(highlighted.top(), -ASCENT);
    let (transform, _) = layout.placed_fragments()[1];
    assert_close(transform.x, 2.0 * CHAR);
    assert_close(layout.line_bounds(0).unwrap().width, 5.0 * CHAR);
}

#[test]
fn test_custom_tag_with_same_bounds_is_not_pinned() {
    let wrapper: TagWrapper = Rc::new(|mut fragment: Fragment| {
        if let FragmentKind::Container(container) = &mut fragment.kind {
            container.direction = Direction::Ltr;
        }
        fragment
    });
    let mut options = strict();
    options.insert_tag("plain", wrapper);
    let layout = layout_of("<plain>ab</plain>", options);
    assert_close(placed_bounds(&layout, 0).width, 2.0 * CHAR);
}

#[test]
fn test_unregistered_tag_is_a_plain_group() {
    let layout = layout_of("<custom>ab</custom>c", strict());
    assert_eq!(layout.text_content(), "abc");
    assert_close(placed_bounds(&layout, 1).left(), 2.0 * CHAR);
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

#[test]
fn test_rtl_span_occupies_its_own_width() {
    let layout = layout_of("<span dir=\"rtl\">ab cd</span>", strict());
    assert_eq!(layout.leaves()[0].direction, Direction::Rtl);
    let bounds = layout.line_bounds(0).unwrap();
    assert_close(bounds.left(), 0.0);
    assert_close(bounds.width, 5.0 * CHAR);
}

#[test]
fn test_rtl_children_flow_leftwards() {
    let layout = layout_of("<span dir=\"rtl\"><b>ab</b>cd</span>", strict());
    let (_, span) = layout.placed_fragments()[0];
    let bold = span.children()[0].bounds().unwrap();
    let plain = span.children()[1].bounds().unwrap();
    assert!(bold.left() > plain.left());
    assert_close(plain.right(), bold.left());
}

#[test]
fn test_embedding_marks_become_spans() {
    let layout = layout_of("a\u{202B}bc\u{202C}d", strict());
    let leaves = layout.leaves();
    assert_eq!(leaves[0].direction, Direction::Ltr);
    assert_eq!(leaves[1].direction, Direction::Rtl);
    assert_eq!(leaves[2].direction, Direction::Ltr);
}

#[test]
fn test_unknown_dir_is_ignored() {
    let layout = layout_of("<span dir=\"sideways\">ab</span>", strict());
    assert_eq!(layout.leaves()[0].direction, Direction::Ltr);
}
