//! Layout configuration
//!
//! Every property a [`crate::RichText`] exposes, with its defaults. The
//! plain-data part deserializes from kebab-case JSON; link callbacks,
//! embedded visuals and custom tag wrappers can only be set from code.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::layout::fragment::{Fragment, InlineVisual};
use crate::layout::links::LinkTarget;
use crate::style::{ColorValue, FontDescriptor};

/// Replaces the fragment of a custom tag with a decorated one.
pub type TagWrapper = Rc<dyn Fn(Fragment) -> Fragment>;

/// Horizontal alignment of lines within the block.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    /// Share the block's left edge.
    #[default]
    Left,
    /// Share the block's horizontal center.
    Center,
    /// Share the block's right edge.
    Right,
}

/// How wide a line may grow before wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(try_from = "LineWrapRepr")]
pub enum LineWrap {
    /// Never wrap.
    #[default]
    None,
    /// Wrap at a fixed width in px.
    Fixed(f32),
    /// Wrap at the host's preferred width and report a minimum width.
    Stretch,
}

/// JSON form of [`LineWrap`]: a number, `"stretch"`, `"none"` or `null`.
#[derive(Deserialize)]
#[serde(untagged)]
enum LineWrapRepr {
    Width(f32),
    Keyword(String),
    Unset(()),
}

impl TryFrom<LineWrapRepr> for LineWrap {
    type Error = String;

    fn try_from(value: LineWrapRepr) -> Result<Self, Self::Error> {
        match value {
            LineWrapRepr::Width(width) if width.is_finite() && width > 0.0 => Ok(Self::Fixed(width)),
            LineWrapRepr::Width(width) => Err(format!("line wrap width must be positive, got {width}")),
            LineWrapRepr::Keyword(keyword) => match keyword.as_str() {
                "stretch" => Ok(Self::Stretch),
                "none" => Ok(Self::None),
                other => Err(format!("unknown line wrap `{other}`")),
            },
            LineWrapRepr::Unset(()) => Ok(Self::None),
        }
    }
}

/// Which `href` values an anchor may use.
#[derive(Clone, Deserialize)]
#[serde(from = "LinkPolicyRepr")]
pub enum LinkPolicy {
    /// Any `href` is used as written.
    Direct,
    /// `href` must be a `{{placeholder}}` (or bare key) present in the map.
    Map(HashMap<String, LinkTarget>),
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self::Map(HashMap::new())
    }
}

impl fmt::Debug for LinkPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => f.write_str("Direct"),
            Self::Map(map) => {
                let mut keys: Vec<_> = map.keys().collect();
                keys.sort();
                f.debug_tuple("Map").field(&keys).finish()
            }
        }
    }
}

/// JSON form of [`LinkPolicy`]: `true` allows direct links, an object maps
/// placeholders to URLs.
#[derive(Deserialize)]
#[serde(untagged)]
enum LinkPolicyRepr {
    Unrestricted(bool),
    Map(HashMap<String, String>),
}

impl From<LinkPolicyRepr> for LinkPolicy {
    fn from(value: LinkPolicyRepr) -> Self {
        match value {
            LinkPolicyRepr::Unrestricted(true) => Self::Direct,
            LinkPolicyRepr::Unrestricted(false) => Self::default(),
            LinkPolicyRepr::Map(map) => Self::Map(
                map.into_iter()
                    .map(|(key, url)| (key, LinkTarget::Url(url)))
                    .collect(),
            ),
        }
    }
}

/// What happens when markup references something that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Validation {
    /// Unknown style keys, missing embeds, unresolved links and markup
    /// errors fail the rebuild.
    Strict,
    /// The offending piece is skipped with a warning; unparseable markup is
    /// replaced by [`INVALID_MARKUP_TEXT`].
    Lenient,
}

impl Default for Validation {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Strict
        } else {
            Self::Lenient
        }
    }
}

/// Shown instead of markup that failed to parse under [`Validation::Lenient`].
pub const INVALID_MARKUP_TEXT: &str = "INVALID TRANSLATION";

/// The complete configuration of a rich-text block.
#[derive(Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RichTextOptions {
    /// Base font.
    pub font: FontDescriptor,
    /// Base fill.
    pub fill: ColorValue,
    /// Base stroke; `None` for no outline.
    pub stroke: Option<ColorValue>,
    /// Stroke width.
    pub stroke_width: f32,
    /// Scale applied inside `<sub>`.
    pub sub_scale: f32,
    /// Horizontal gap before a `<sub>`, in the parent's px.
    pub sub_x_spacing: f32,
    /// Vertical offset of a `<sub>` from the baseline.
    pub sub_y_offset: f32,
    /// Scale applied inside `<sup>`.
    pub sup_scale: f32,
    /// Horizontal gap before a `<sup>`, in the parent's px.
    pub sup_x_spacing: f32,
    /// Vertical offset of a `<sup>` from its cap-height position.
    pub sup_y_offset: f32,
    /// Fraction of the cap height a `<sup>` is centered at.
    pub cap_height_scale: f32,
    /// Underline thickness.
    pub underline_line_width: f32,
    /// Underline position as a fraction of the content's height above the baseline.
    pub underline_height_scale: f32,
    /// Strikethrough thickness.
    pub strikethrough_line_width: f32,
    /// Strikethrough position as a fraction of the content's height above the baseline.
    pub strikethrough_height_scale: f32,
    /// Fill of resolved links.
    pub link_fill: ColorValue,
    /// Whether link groups mark their input events as handled.
    pub link_events_handled: bool,
    /// Allowed anchor targets.
    pub links: LinkPolicy,
    /// Visuals available to `<node id>`.
    #[serde(skip)]
    pub nodes: HashMap<String, Rc<dyn InlineVisual>>,
    /// Wrappers for application-defined tags.
    #[serde(skip)]
    pub tags: HashMap<String, TagWrapper>,
    /// Whether a literal `\n` becomes `<br>`.
    pub replace_newlines: bool,
    /// Line alignment.
    pub align: Align,
    /// Extra vertical space between consecutive lines.
    pub leading: f32,
    /// Wrapping mode.
    pub line_wrap: LineWrap,
    /// Failure policy.
    pub validation: Validation,
}

impl Default for RichTextOptions {
    fn default() -> Self {
        Self {
            font: FontDescriptor::default(),
            fill: ColorValue::BLACK,
            stroke: None,
            stroke_width: 1.0,
            sub_scale: 0.75,
            sub_x_spacing: 0.0,
            sub_y_offset: 0.0,
            sup_scale: 0.75,
            sup_x_spacing: 0.0,
            sup_y_offset: 0.0,
            cap_height_scale: 0.75,
            underline_line_width: 1.0,
            underline_height_scale: 0.15,
            strikethrough_line_width: 1.0,
            strikethrough_height_scale: 0.3,
            link_fill: ColorValue::LINK_BLUE,
            link_events_handled: false,
            links: LinkPolicy::default(),
            nodes: HashMap::new(),
            tags: HashMap::new(),
            replace_newlines: false,
            align: Align::Left,
            leading: 0.0,
            line_wrap: LineWrap::None,
            validation: Validation::default(),
        }
    }
}

impl fmt::Debug for RichTextOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut nodes: Vec<_> = self.nodes.keys().collect();
        nodes.sort();
        let mut tags: Vec<_> = self.tags.keys().collect();
        tags.sort();
        f.debug_struct("RichTextOptions")
            .field("font", &self.font)
            .field("fill", &self.fill)
            .field("stroke", &self.stroke)
            .field("links", &self.links)
            .field("nodes", &nodes)
            .field("tags", &tags)
            .field("align", &self.align)
            .field("leading", &self.leading)
            .field("line_wrap", &self.line_wrap)
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}

impl RichTextOptions {
    /// Options that wrap at `width` px.
    #[must_use]
    pub fn wrapped(width: f32) -> Self {
        Self {
            line_wrap: LineWrap::Fixed(width),
            ..Self::default()
        }
    }

    /// Register a visual for `<node id="...">`.
    pub fn insert_node(&mut self, id: impl Into<String>, visual: Rc<dyn InlineVisual>) {
        let _ = self.nodes.insert(id.into(), visual);
    }

    /// Register a wrapper for a custom tag name.
    pub fn insert_tag(&mut self, tag_name: impl Into<String>, wrapper: TagWrapper) {
        let _ = self.tags.insert(tag_name.into().to_ascii_lowercase(), wrapper);
    }

    /// Map a link placeholder to a target, switching to a map policy if
    /// links were unrestricted.
    pub fn insert_link(&mut self, placeholder: impl Into<String>, target: LinkTarget) {
        if let LinkPolicy::Map(map) = &mut self.links {
            let _ = map.insert(placeholder.into(), target);
        } else {
            self.links = LinkPolicy::Map(HashMap::from([(placeholder.into(), target)]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RichTextOptions::default();
        assert_eq!(options.font.to_css(), "16px sans-serif");
        assert_eq!(options.link_fill, ColorValue::rgb(27, 0, 241));
        assert_eq!(options.line_wrap, LineWrap::None);
        assert_eq!(options.align, Align::Left);
        assert!(matches!(options.links, LinkPolicy::Map(ref map) if map.is_empty()));
    }

    #[test]
    fn test_line_wrap_from_json() {
        let parse = |json: &str| serde_json::from_str::<LineWrap>(json);
        assert_eq!(parse("240").unwrap(), LineWrap::Fixed(240.0));
        assert_eq!(parse("\"stretch\"").unwrap(), LineWrap::Stretch);
        assert_eq!(parse("null").unwrap(), LineWrap::None);
        assert!(parse("-3").is_err());
        assert!(parse("\"auto\"").is_err());
    }

    #[test]
    fn test_options_from_json() {
        let options: RichTextOptions = serde_json::from_str(
            r##"{
                "font": "bold 20px serif",
                "fill": "#336699",
                "links": { "home": "https://example.com" },
                "align": "center",
                "line-wrap": 300,
                "sub-scale": 0.5,
                "validation": "lenient"
            }"##,
        )
        .unwrap();
        assert!(options.font.is_bold());
        assert_eq!(options.fill, ColorValue::rgb(0x33, 0x66, 0x99));
        assert_eq!(options.align, Align::Center);
        assert_eq!(options.line_wrap, LineWrap::Fixed(300.0));
        assert_eq!(options.sub_scale, 0.5);
        assert_eq!(options.sup_scale, 0.75);
        assert_eq!(options.validation, Validation::Lenient);
        assert!(matches!(options.links, LinkPolicy::Map(ref map) if map.contains_key("home")));
    }

    #[test]
    fn test_unrestricted_links_from_json() {
        let options: RichTextOptions = serde_json::from_str(r#"{ "links": true }"#).unwrap();
        assert!(matches!(options.links, LinkPolicy::Direct));
    }
}
