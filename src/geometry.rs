//! Tooltip placement arithmetic.
//!
//! Everything here is a pure function of the rectangles passed in. Callers
//! read fresh geometry for every call; nothing is cached between calls, so
//! the same functions serve after a resize or scroll without residual state.

use serde::{Deserialize, Serialize};

/// A point in viewport coordinates (y grows downward).
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - origin`.
    pub fn delta_from(self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }
}

/// A width/height pair.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Layout rect in viewport coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_position(position: Position, size: Size) -> Self {
        Self::new(position.left, position.top, size.width, size.height)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Whether the rect lies entirely inside a viewport anchored at the origin.
    pub fn is_within(&self, viewport: Size) -> bool {
        self.top() >= 0.0
            && self.left() >= 0.0
            && self.bottom() <= viewport.height
            && self.right() <= viewport.width
    }
}

/// Top-left corner of the tooltip, as written to its `top`/`left` style.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub top: f32,
    pub left: f32,
}

impl Position {
    pub fn new(top: f32, left: f32) -> Self {
        Self { top, left }
    }
}

/// Distances used by the placement functions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    /// Minimum distance between an anchored tooltip and the viewport edge.
    pub viewport: f32,
    /// Gap between the anchor and the tooltip.
    pub anchor_gap: f32,
    /// Minimum distance between a dragged tooltip and the viewport edge.
    pub drag: f32,
    /// Smallest arrow offset from the tooltip's left edge.
    pub arrow_min: f32,
    /// The arrow offset never exceeds `tooltip width - arrow_max_inset`.
    pub arrow_max_inset: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            viewport: 20.0,
            anchor_gap: 10.0,
            drag: 10.0,
            arrow_min: 15.0,
            arrow_max_inset: 25.0,
        }
    }
}

/// Result of anchoring a tooltip to an indicator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Position,
    /// The tooltip sits above the anchor because it did not fit below.
    pub flipped_above: bool,
    /// Horizontal offset of the arrow from the tooltip's left edge.
    pub arrow_left: f32,
}

/// Place a tooltip below `anchor`, centered on it, flipping above when the
/// bottom edge would overflow the viewport.
pub fn anchored_position(anchor: Rect, tooltip: Size, viewport: Size, margins: &Margins) -> Placement {
    let center_x = anchor.center_x();

    let mut left = center_x - tooltip.width / 2.0;
    let min_left = margins.viewport;
    let max_left = viewport.width - tooltip.width - margins.viewport;
    if left < min_left {
        left = min_left;
    }
    if left > max_left {
        left = max_left;
    }

    let mut top = anchor.bottom() + margins.anchor_gap;
    let flipped_above = top + tooltip.height > viewport.height - margins.viewport;
    if flipped_above {
        top = anchor.top() - tooltip.height - margins.anchor_gap;
        // An anchor scrolled past the bottom edge would push the flipped
        // tooltip out as well.
        top = top.min(viewport.height - tooltip.height - margins.viewport);
    }
    if top < margins.viewport {
        top = margins.viewport;
    }

    Placement {
        position: Position::new(top, left),
        flipped_above,
        arrow_left: arrow_offset(center_x - left, tooltip.width, margins),
    }
}

/// Arrow offset for a tooltip whose left edge sits at `left`, pointing at
/// `anchor`'s center.
pub fn arrow_toward(anchor: Rect, left: f32, tooltip: Size, margins: &Margins) -> f32 {
    arrow_offset(anchor.center_x() - left, tooltip.width, margins)
}

/// Clamp the arrow so it always points from inside the tooltip body.
fn arrow_offset(raw: f32, tooltip_width: f32, margins: &Margins) -> f32 {
    let mut arrow = raw;
    if arrow < margins.arrow_min {
        arrow = margins.arrow_min;
    }
    if arrow > tooltip_width - margins.arrow_max_inset {
        arrow = tooltip_width - margins.arrow_max_inset;
    }
    arrow
}

/// New tooltip position for a drag: the start rect moved by `delta`, kept at
/// least `margins.drag` inside the viewport on every side.
pub fn drag_position(delta: Point, start: Rect, viewport: Size, tooltip: Size, margins: &Margins) -> Position {
    let left = clamp_low_wins(
        start.left() + delta.x,
        margins.drag,
        viewport.width - tooltip.width - margins.drag,
    );
    let top = clamp_low_wins(
        start.top() + delta.y,
        margins.drag,
        viewport.height - tooltip.height - margins.drag,
    );
    Position::new(top, left)
}

/// Re-fit a remembered position into the current viewport.
pub fn refit_position(position: Position, viewport: Size, tooltip: Size, margins: &Margins) -> Position {
    drag_position(
        Point::default(),
        Rect::from_position(position, tooltip),
        viewport,
        tooltip,
        margins,
    )
}

/// `max(low, min(value, high))`; unlike `f32::clamp` this never panics when
/// `low > high` (tooltip larger than the viewport) and keeps the low edge.
fn clamp_low_wins(value: f32, low: f32, high: f32) -> f32 {
    low.max(value.min(high))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_low_wins_when_range_inverted() {
        assert_eq!(clamp_low_wins(50.0, 10.0, -5.0), 10.0);
        assert_eq!(clamp_low_wins(50.0, 10.0, 40.0), 40.0);
        assert_eq!(clamp_low_wins(0.0, 10.0, 40.0), 10.0);
    }

    #[test]
    fn test_arrow_offset_bounds() {
        let m = Margins::default();
        assert_eq!(arrow_offset(2.0, 200.0, &m), 15.0);
        assert_eq!(arrow_offset(190.0, 200.0, &m), 175.0);
        assert_eq!(arrow_offset(80.0, 200.0, &m), 80.0);
    }
}
