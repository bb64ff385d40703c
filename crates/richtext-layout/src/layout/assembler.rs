//! Line assembly
//!
//! Drives the engine over the top-level nodes of the forest, closing a line
//! whenever the engine reports a break, and stacks the finished lines.

use serde::Serialize;

use super::box_model::{Rect, Transform};
use super::engine::{BreakSignal, LineBreakEngine, LineState};
use super::fragment::{Container, Fragment, TextLeaf};
use crate::error::LayoutError;
use crate::style::StyleContext;

/// One laid-out line.
#[derive(Debug, Clone, Serialize)]
pub struct Line {
    /// Position of the line's baseline origin in the block.
    pub transform: Transform,
    /// Fragments on the line, left to right.
    pub content: Container,
}

impl Line {
    /// Bounds of what is still on the line, in block coordinates.
    ///
    /// Link members moved into link groups are not included.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.content
            .bounds()
            .map(|bounds| self.transform.apply_rect(&bounds))
    }

    /// Top-level fragments.
    #[must_use]
    pub fn fragments(&self) -> &[Fragment] {
        &self.content.children
    }

    /// Text leaves still on the line, in order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&TextLeaf> {
        self.content
            .children
            .iter()
            .flat_map(Fragment::leaves)
            .collect()
    }
}

/// Lay out the whole forest into lines of at most `wrap_width`, separated by
/// `leading`.
///
/// Always returns at least one line: blank or empty input yields one line
/// holding an empty leaf.
///
/// # Errors
///
/// Propagates validation failures from the engine.
pub fn assemble(
    engine: &mut LineBreakEngine<'_>,
    style: &StyleContext,
    wrap_width: f32,
    leading: f32,
) -> Result<Vec<Line>, LayoutError> {
    let tree = engine.tree();
    let forest = tree.children(tree.root());
    let mut finished = Vec::new();
    let mut current = Container::new(style.direction, 0.0, 0.0);
    let mut state = LineState::default();
    let mut position = 0;

    while position < forest.len() {
        let available = wrap_width - current.advance();
        let signal = engine.append_element(&mut current, forest[position], style, available, 1.0, &mut state)?;

        if signal != BreakSignal::None {
            let line = std::mem::replace(&mut current, Container::new(style.direction, 0.0, 0.0));
            finished.push(non_empty(line, engine, style));
            state = LineState::default();
        }
        if signal != BreakSignal::Incomplete {
            position += 1;
        }
    }
    if current.bounds().is_some() {
        finished.push(current);
    }
    if finished.is_empty() {
        finished.push(non_empty(Container::new(style.direction, 0.0, 0.0), engine, style));
    }

    Ok(stack(finished, leading))
}

/// A line with no bounds gets an empty leaf so it keeps a line's height.
fn non_empty(mut line: Container, engine: &mut LineBreakEngine<'_>, style: &StyleContext) -> Container {
    if line.bounds().is_none() {
        line.add(engine.placeholder(style));
    }
    line
}

/// Each line's top sits `leading` below the previous line's bottom. The first baseline is at `y = 0`.
fn stack(containers: Vec<Container>, leading: f32) -> Vec<Line> {
    let mut lines = Vec::with_capacity(containers.len());
    let mut previous_bottom: Option<f32> = None;
    for content in containers {
        let bounds = content.bounds().unwrap_or_default();
        let y = previous_bottom.map_or(0.0, |bottom| bottom + leading - bounds.top());
        previous_bottom = Some(y + bounds.bottom());
        lines.push(Line {
            transform: Transform::translation(0.0, y),
            content,
        });
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::metrics::ApproximateFontMetrics;
    use crate::options::RichTextOptions;

    fn lines_of(markup: &str, wrap_width: f32, leading: f32) -> Vec<Line> {
        let tree = richtext_markup::parse(markup).unwrap();
        let options = RichTextOptions::default();
        let mut engine = LineBreakEngine::new(&tree, &options, &ApproximateFontMetrics);
        let style = StyleContext::from_options(&options);
        assemble(&mut engine, &style, wrap_width, leading).unwrap()
    }

    fn texts(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.leaves().iter().map(|leaf| leaf.visible_text()).collect::<Vec<_>>().join(""))
            .collect()
    }

    #[test]
    fn test_consecutive_breaks_leave_a_blank_line() {
        let lines = lines_of("a<br><br>b", f32::INFINITY, 0.0);
        assert_eq!(texts(&lines), vec!["a", "", "b"]);
        assert!(lines[1].bounds().is_some_and(|bounds| bounds.height > 0.0));
    }

    #[test]
    fn test_trailing_break_adds_no_line() {
        assert_eq!(lines_of("a<br>", f32::INFINITY, 0.0).len(), 1);
    }

    #[test]
    fn test_empty_and_blank_input_give_one_line() {
        for markup in ["", "   "] {
            let lines = lines_of(markup, 100.0, 0.0);
            assert_eq!(lines.len(), 1);
            assert!(lines[0].bounds().is_some());
        }
    }

    #[test]
    fn test_lines_stack_with_leading() {
        let lines = lines_of("a<br>b", f32::INFINITY, 5.0);
        let first = lines[0].bounds().unwrap();
        let second = lines[1].bounds().unwrap();
        assert_eq!(lines[0].transform.y, 0.0);
        assert!((second.top() - (first.bottom() + 5.0)).abs() < 1e-4);
    }

    #[test]
    fn test_wraps_across_elements() {
        let lines = lines_of("one <b>two</b> three", 8.0 * 9.6, 0.0);
        assert_eq!(texts(&lines), vec!["onetwo", "three"]);
    }
}
