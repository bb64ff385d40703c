//! Geometry shared by fragments and lines.
//!
//! Coordinates are y-down with the text baseline at `y = 0` inside a line.

use serde::Serialize;

/// An axis-aligned rectangle positioned in 2D space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    /// Horizontal position of the top-left corner.
    pub x: f32,
    /// Vertical position of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning two x and two y coordinates, in any order.
    #[must_use]
    pub fn from_edges(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        let left = x1.min(x2);
        let top = y1.min(y2);
        Self::new(left, top, (x2 - x1).abs(), (y2 - y1).abs())
    }

    /// Left edge.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.x
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge.
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.y
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Horizontal center.
    #[must_use]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Vertical center.
    #[must_use]
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Whether every coordinate is finite.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Smallest rectangle containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::from_edges(
            self.left().min(other.left()),
            self.top().min(other.top()),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Union over an iterator; `None` when it is empty.
    #[must_use]
    pub fn union_all(rects: impl IntoIterator<Item = Self>) -> Option<Self> {
        rects.into_iter().reduce(|acc, rect| acc.union(&rect))
    }

    /// Same rectangle moved by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Placement of a fragment in its parent's coordinate space.
///
/// A point `p` in local space maps to `(x + scale * p.x, y + scale * p.y)`.
/// Only uniform scale is needed: sub/superscripts shrink their content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    /// Horizontal offset.
    pub x: f32,
    /// Vertical offset.
    pub y: f32,
    /// Uniform scale factor.
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// No offset, unit scale.
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        scale: 1.0,
    };

    /// Pure translation.
    #[must_use]
    pub const fn translation(x: f32, y: f32) -> Self {
        Self { x, y, scale: 1.0 }
    }

    /// Map a local point into the parent's space.
    #[must_use]
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (self.x + self.scale * x, self.y + self.scale * y)
    }

    /// Map a local rectangle into the parent's space.
    #[must_use]
    pub fn apply_rect(&self, rect: &Rect) -> Rect {
        let (x, y) = self.apply(rect.x, rect.y);
        Rect::new(x, y, rect.width * self.scale, rect.height * self.scale)
    }

    /// `self` applied after `inner`: the transform of a grandchild expressed
    /// in the grandparent's space.
    #[must_use]
    pub fn then(&self, inner: &Self) -> Self {
        let (x, y) = self.apply(inner.x, inner.y);
        Self {
            x,
            y,
            scale: self.scale * inner.scale,
        }
    }

    /// The transform that undoes this one.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let scale = if self.scale == 0.0 { 1.0 } else { 1.0 / self.scale };
        Self {
            x: -self.x * scale,
            y: -self.y * scale,
            scale,
        }
    }
}
