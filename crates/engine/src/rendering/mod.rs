mod canvas;
mod font;
mod placeholder;
mod sprites;
mod surface;
mod view;

pub use canvas::{lerp_rgba, with_alpha, Canvas, Rgba, ScreenRect, BLACK};
pub use font::{draw_text, line_height, text_width};
pub use placeholder::{building_windows, draw_placeholder, palette_index, PlaceholderKind};
pub use sprites::{SpriteCache, SpriteImage, Texture};
pub use surface::{validate_surface, MemorySurface, Surface, SurfaceError};
pub use view::ViewTransform;

use crate::camera::Camera;
use crate::geometry::Rect;

/// Everything a layer needs to draw one frame.
pub struct RenderTarget<'a> {
    pub canvas: Canvas<'a>,
    pub sprites: &'a mut SpriteCache,
    pub camera: &'a Camera,
    pub view: ViewTransform,
    pub tile_size: f32,
    /// Milliseconds of simulated time, for animation.
    pub clock_ms: f64,
}

impl RenderTarget<'_> {
    /// Draws the sprite into `dest`. Returns `false` when the caller should draw a placeholder.
    pub fn draw_sprite(&mut self, sprite_id: Option<&str>, dest: ScreenRect) -> bool {
        let Some(sprite_id) = sprite_id else {
            return false;
        };
        match self.sprites.texture(sprite_id) {
            Texture::Image(image) => {
                self.canvas.draw_image(image, dest);
                true
            }
            Texture::Placeholder => false,
        }
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    /// Culls world-space bounds. Camera-relative views test against the camera viewport.
    pub fn is_visible(&self, bounds: Rect, padding: i32) -> bool {
        if self.view.follows(self.camera) {
            return self.camera.is_visible(
                bounds.x,
                bounds.y,
                bounds.width,
                bounds.height,
                padding as f32,
            );
        }
        let (width, height) = self.canvas_size();
        self.view.is_on_canvas(bounds, width, height, padding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible(view: impl Fn(&Camera) -> ViewTransform, bounds: Rect) -> bool {
        let mut frame = vec![0u8; 64 * 48 * 4];
        let mut sprites = SpriteCache::new(None);
        let mut camera = Camera::new(64.0, 48.0, 1.0);
        camera.set_world_bounds(256.0, 256.0);
        camera.snap_to(128.0, 128.0);
        let target = RenderTarget {
            canvas: Canvas::new(&mut frame, 64, 48),
            sprites: &mut sprites,
            view: view(&camera),
            camera: &camera,
            tile_size: 16.0,
            clock_ms: 0.0,
        };
        target.is_visible(bounds, 0)
    }

    #[test]
    fn camera_view_culls_against_viewport() {
        let inside = Rect::new(100.0, 110.0, 8.0, 8.0);
        let origin = Rect::new(0.0, 0.0, 8.0, 8.0);
        assert!(visible(ViewTransform::from_camera, inside));
        assert!(!visible(ViewTransform::from_camera, origin));
    }

    #[test]
    fn fixed_view_culls_against_canvas() {
        let stretched = |_: &Camera| ViewTransform::stretched(256.0, 256.0, 64, 48);
        assert!(visible(stretched, Rect::new(0.0, 0.0, 8.0, 8.0)));
        assert!(visible(stretched, Rect::new(200.0, 200.0, 8.0, 8.0)));
        assert!(!visible(stretched, Rect::new(300.0, 0.0, 8.0, 8.0)));
    }
}
