use crate::camera::Camera;
use crate::geometry::{Rect, WorldPosition};

use super::canvas::ScreenRect;

/// World-to-canvas mapping used by every layer for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub offset_x: f32,
    pub offset_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl ViewTransform {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            offset_x: -camera.x(),
            offset_y: -camera.y(),
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Stretches a whole world onto the canvas.
    pub fn stretched(
        world_width: f32,
        world_height: f32,
        canvas_width: u32,
        canvas_height: u32,
    ) -> Self {
        if world_width <= 0.0 || world_height <= 0.0 {
            return Self::default();
        }
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale_x: canvas_width as f32 / world_width,
            scale_y: canvas_height as f32 / world_height,
        }
    }

    /// Centers content of the given size at 1:1 scale.
    pub fn centered(
        content_width: f32,
        content_height: f32,
        canvas_width: u32,
        canvas_height: u32,
    ) -> Self {
        Self {
            offset_x: ((canvas_width as f32 - content_width) * 0.5).floor(),
            offset_y: ((canvas_height as f32 - content_height) * 0.5).floor(),
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    pub fn to_screen(&self, world: WorldPosition) -> (i32, i32) {
        (
            (world.x * self.scale_x + self.offset_x).round() as i32,
            (world.y * self.scale_y + self.offset_y).round() as i32,
        )
    }

    pub fn to_world(&self, screen_x: f32, screen_y: f32) -> WorldPosition {
        WorldPosition::new(
            (screen_x - self.offset_x) / self.scale_x,
            (screen_y - self.offset_y) / self.scale_y,
        )
    }

    /// Rounds both edges so adjacent tiles share a border with no gaps.
    pub fn rect_to_screen(&self, rect: Rect) -> ScreenRect {
        let (left, top) = self.to_screen(WorldPosition::new(rect.x, rect.y));
        let (right, bottom) = self.to_screen(WorldPosition::new(rect.right(), rect.bottom()));
        ScreenRect::new(left, top, right - left, bottom - top)
    }

    pub fn scale_len(&self, length: f32) -> i32 {
        (length * self.scale_x.min(self.scale_y)).round() as i32
    }

    /// True when this is the plain camera offset at 1:1 scale.
    pub fn follows(&self, camera: &Camera) -> bool {
        *self == Self::from_camera(camera)
    }

    pub fn is_on_canvas(
        &self,
        rect: Rect,
        canvas_width: u32,
        canvas_height: u32,
        padding: i32,
    ) -> bool {
        let screen = self.rect_to_screen(rect);
        screen.x + screen.width >= -padding
            && screen.x <= canvas_width as i32 + padding
            && screen.y + screen.height >= -padding
            && screen.y <= canvas_height as i32 + padding
    }
}
