//! Block alignment
//!
//! Lines are built left-anchored. Afterwards every line is shifted so it
//! shares the block's left edge, center or right edge.

use super::assembler::Line;
use super::box_model::Rect;
use super::links::LinkGroup;
use crate::options::Align;

/// Bounds of line `index` including the link members laid out on it.
#[must_use]
pub fn line_bounds(lines: &[Line], links: &[LinkGroup], index: usize) -> Option<Rect> {
    let own = lines.get(index).and_then(Line::bounds);
    let members = links
        .iter()
        .flat_map(|group| &group.members)
        .filter(|member| member.line == index)
        .filter_map(|member| member.fragment.bounds());
    Rect::union_all(own.into_iter().chain(members))
}

/// Shift each line, and the link members that came from it, to `align`.
pub fn align_lines(lines: &mut [Line], links: &mut [LinkGroup], align: Align) {
    let per_line: Vec<Option<Rect>> = (0..lines.len())
        .map(|index| line_bounds(lines, links, index))
        .collect();
    let Some(block) = Rect::union_all(per_line.iter().flatten().copied()) else {
        return;
    };

    for (index, (line, bounds)) in lines.iter_mut().zip(&per_line).enumerate() {
        let Some(bounds) = bounds else {
            continue;
        };
        let dx = match align {
            Align::Left => block.left() - bounds.left(),
            Align::Center => block.center_x() - bounds.center_x(),
            Align::Right => block.right() - bounds.right(),
        };
        if dx == 0.0 {
            continue;
        }
        line.transform.x += dx;
        for member in links
            .iter_mut()
            .flat_map(|group| &mut group.members)
            .filter(|member| member.line == index)
        {
            member.fragment.transform.x += dx;
        }
    }
}
