use std::borrow::Cow;

use crate::geometry::{Direction, Rect};
use crate::rendering::{draw_placeholder, PlaceholderKind, RenderTarget};

const CULL_PADDING_PX: i32 = 16;

/// One drawable in a depth-sorted pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthItem<'a> {
    pub kind: PlaceholderKind,
    /// World-space bounds; the bottom edge is the depth key.
    pub bounds: Rect,
    pub sprite_id: Option<Cow<'a, str>>,
    /// Stable id used to vary placeholder colours.
    pub seed: &'a str,
    pub facing: Direction,
}

impl DepthItem<'_> {
    pub fn depth_key(&self) -> f32 {
        self.bounds.bottom()
    }
}

/// Stable, so items on the same row keep their insertion order.
pub fn sort_by_depth(items: &mut [DepthItem<'_>]) {
    items.sort_by(|a, b| a.depth_key().total_cmp(&b.depth_key()));
}

/// Sorts then draws back to front, culling items that are off the canvas.
pub fn draw_depth_sorted(target: &mut RenderTarget<'_>, items: &mut [DepthItem<'_>]) {
    sort_by_depth(items);
    for item in items.iter() {
        if !target.is_visible(item.bounds, CULL_PADDING_PX) {
            continue;
        }
        let rect = target.view.rect_to_screen(item.bounds);
        if target.draw_sprite(item.sprite_id.as_deref(), rect) {
            continue;
        }
        draw_placeholder(&mut target.canvas, item.kind, rect, item.seed, item.facing);
    }
}
