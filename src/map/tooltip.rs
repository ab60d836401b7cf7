//! Hover preview placement.

use crate::data::MarkerId;
use eframe::egui::{Pos2, Rect, Vec2};

/// Gap between the marker and the tooltip box.
pub const TOOLTIP_GAP: f32 = 15.0;
/// Minimum distance kept from the viewport edges.
pub const VIEWPORT_MARGIN: f32 = 8.0;

/// Hover preview for the current redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub anchor: MarkerId,
    /// Index of the anchor marker in the view's marker list.
    pub anchor_index: usize,
    pub anchor_screen: Pos2,
    pub content: String,
}

/// Top-left corner of a tooltip of `content_size` anchored at `anchor`.
///
/// Placed above the marker, flipped below when it would cross the top
/// margin, horizontally centered and kept inside the viewport.
pub fn position(anchor: Pos2, content_size: Vec2, viewport: Rect) -> Pos2 {
    let above = anchor.y - TOOLTIP_GAP - content_size.y;
    let y = if above < viewport.top() + VIEWPORT_MARGIN {
        anchor.y + TOOLTIP_GAP
    } else {
        above
    };

    let min_x = viewport.left() + VIEWPORT_MARGIN;
    let max_x = viewport.right() - VIEWPORT_MARGIN - content_size.x;
    let centered = anchor.x - content_size.x / 2.0;
    let x = if max_x < min_x {
        min_x
    } else {
        centered.clamp(min_x, max_x)
    };

    Pos2::new(x, y)
}
