use crate::geometry::{TileRect, WorldPosition};

/// Reference frame length the follow speed is tuned against.
const REFERENCE_FRAME_MS: f32 = 16.67;
const SNAP_EPSILON_PX: f32 = 0.01;

/// Viewport over the world. `x`/`y` is the top-left corner in world pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    x: f32,
    y: f32,
    target_x: f32,
    target_y: f32,
    viewport_width: f32,
    viewport_height: f32,
    world_width: f32,
    world_height: f32,
    follow_speed: f32,
}

impl Camera {
    pub fn new(viewport_width: f32, viewport_height: f32, follow_speed: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            target_x: 0.0,
            target_y: 0.0,
            viewport_width,
            viewport_height,
            world_width: 0.0,
            world_height: 0.0,
            follow_speed: follow_speed.clamp(0.0, 1.0),
        }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn position(&self) -> WorldPosition {
        WorldPosition::new(self.x, self.y)
    }

    pub fn target(&self) -> WorldPosition {
        WorldPosition::new(self.target_x, self.target_y)
    }

    pub fn viewport_size(&self) -> (f32, f32) {
        (self.viewport_width, self.viewport_height)
    }

    pub fn world_size(&self) -> (f32, f32) {
        (self.world_width, self.world_height)
    }

    pub fn set_world_bounds(&mut self, width: f32, height: f32) {
        self.world_width = width.max(0.0);
        self.world_height = height.max(0.0);
        self.reclamp();
    }

    /// Aims the viewport so `(x, y)` ends up centered, subject to world bounds.
    pub fn set_target(&mut self, x: f32, y: f32) {
        let (tx, ty) = self.clamp_top_left(
            x - self.viewport_width * 0.5,
            y - self.viewport_height * 0.5,
        );
        self.target_x = tx;
        self.target_y = ty;
    }

    /// Jumps straight to the target for `(x, y)` without smoothing.
    pub fn snap_to(&mut self, x: f32, y: f32) {
        self.set_target(x, y);
        self.x = self.target_x;
        self.y = self.target_y;
    }

    pub fn update(&mut self, dt_ms: f32) {
        if dt_ms <= 0.0 {
            return;
        }
        let t = 1.0 - (1.0 - self.follow_speed).powf(dt_ms / REFERENCE_FRAME_MS);
        self.x += (self.target_x - self.x) * t;
        self.y += (self.target_y - self.y) * t;
        if (self.target_x - self.x).abs() < SNAP_EPSILON_PX {
            self.x = self.target_x;
        }
        if (self.target_y - self.y).abs() < SNAP_EPSILON_PX {
            self.y = self.target_y;
        }
        let (x, y) = self.clamp_top_left(self.x, self.y);
        self.x = x;
        self.y = y;
    }

    pub fn world_to_screen(&self, world: WorldPosition) -> (f32, f32) {
        (world.x - self.x, world.y - self.y)
    }

    pub fn screen_to_world(&self, screen_x: f32, screen_y: f32) -> WorldPosition {
        WorldPosition::new(screen_x + self.x, screen_y + self.y)
    }

    /// Camera displacement scaled for a background plane. 0 stays fixed, 1 moves with the world.
    pub fn parallax_offset(&self, factor: f32) -> (f32, f32) {
        (self.x * factor, self.y * factor)
    }

    pub fn is_visible(&self, x: f32, y: f32, width: f32, height: f32, padding: f32) -> bool {
        x + width >= self.x - padding
            && x <= self.x + self.viewport_width + padding
            && y + height >= self.y - padding
            && y <= self.y + self.viewport_height + padding
    }

    /// Inclusive tile range under the viewport, clamped to the map. `None` when nothing overlaps.
    pub fn visible_tile_bounds(
        &self,
        tile_size: f32,
        map_width: u32,
        map_height: u32,
    ) -> Option<TileRect> {
        if map_width == 0 || map_height == 0 || tile_size <= 0.0 {
            return None;
        }
        let raw_x_min = (self.x / tile_size).floor() as i32;
        let raw_x_max = ((self.x + self.viewport_width) / tile_size).ceil() as i32 - 1;
        let raw_y_min = (self.y / tile_size).floor() as i32;
        let raw_y_max = ((self.y + self.viewport_height) / tile_size).ceil() as i32 - 1;

        let x_min = raw_x_min.max(0);
        let x_max = raw_x_max.min(map_width as i32 - 1);
        let y_min = raw_y_min.max(0);
        let y_max = raw_y_max.min(map_height as i32 - 1);
        if x_min > x_max || y_min > y_max {
            return None;
        }
        Some(TileRect {
            x_min: x_min as u32,
            x_max: x_max as u32,
            y_min: y_min as u32,
            y_max: y_max as u32,
        })
    }

    fn clamp_top_left(&self, x: f32, y: f32) -> (f32, f32) {
        let max_x = (self.world_width - self.viewport_width).max(0.0);
        let max_y = (self.world_height - self.viewport_height).max(0.0);
        (x.clamp(0.0, max_x), y.clamp(0.0, max_y))
    }

    fn reclamp(&mut self) {
        let (x, y) = self.clamp_top_left(self.x, self.y);
        self.x = x;
        self.y = y;
        let (tx, ty) = self.clamp_top_left(self.target_x, self.target_y);
        self.target_x = tx;
        self.target_y = ty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        let mut camera = Camera::new(320.0, 240.0, 0.1);
        camera.set_world_bounds(640.0, 480.0);
        camera
    }

    #[test]
    fn stays_inside_world_for_any_target() {
        let mut camera = camera();
        for tx in [-1000.0, -5.0, 0.0, 100.0, 320.0, 639.0, 5000.0] {
            for ty in [-300.0, 0.0, 240.0, 470.0, 9000.0] {
                camera.set_target(tx, ty);
                for _ in 0..5 {
                    camera.update(16.67);
                    assert!((0.0..=320.0).contains(&camera.x()), "x={}", camera.x());
                    assert!((0.0..=240.0).contains(&camera.y()), "y={}", camera.y());
                }
            }
        }
    }

    #[test]
    fn world_smaller_than_viewport_pins_to_origin() {
        let mut camera = Camera::new(320.0, 240.0, 0.5);
        camera.set_world_bounds(100.0, 80.0);
        camera.set_target(90.0, 70.0);
        camera.update(100.0);
        assert_eq!(camera.position(), WorldPosition::new(0.0, 0.0));
    }

    #[test]
    fn one_reference_frame_covers_follow_fraction() {
        let mut camera = camera();
        camera.set_target(160.0 + 100.0, 120.0);
        camera.update(REFERENCE_FRAME_MS);
        assert!((camera.x() - 10.0).abs() < 1e-3, "x={}", camera.x());
        assert_eq!(camera.y(), 0.0);
    }

    #[test]
    fn converges_and_snaps_exactly() {
        let mut camera = camera();
        camera.set_target(400.0, 300.0);
        for _ in 0..600 {
            camera.update(16.67);
        }
        assert_eq!(camera.position(), camera.target());
        assert_eq!(camera.position(), WorldPosition::new(240.0, 180.0));
    }

    #[test]
    fn large_frame_delta_moves_further_than_small() {
        let mut slow = camera();
        let mut fast = camera();
        slow.set_target(400.0, 300.0);
        fast.set_target(400.0, 300.0);
        slow.update(16.67);
        fast.update(50.0);
        assert!(fast.x() > slow.x());
    }

    #[test]
    fn screen_world_transforms_are_inverse() {
        let mut camera = camera();
        camera.snap_to(300.0, 200.0);
        let world = WorldPosition::new(210.0, 95.0);
        let (sx, sy) = camera.world_to_screen(world);
        assert_eq!(camera.screen_to_world(sx, sy), world);
        assert_eq!(camera.parallax_offset(0.0), (0.0, 0.0));
        assert_eq!(camera.parallax_offset(1.0), (camera.x(), camera.y()));
    }

    #[test]
    fn visibility_respects_padding() {
        let camera = camera();
        assert!(camera.is_visible(10.0, 10.0, 32.0, 32.0, 0.0));
        assert!(!camera.is_visible(340.0, 10.0, 32.0, 32.0, 0.0));
        assert!(camera.is_visible(340.0, 10.0, 32.0, 32.0, 32.0));
        assert!(!camera.is_visible(-64.0, 10.0, 32.0, 32.0, 16.0));
    }

    #[test]
    fn visible_tiles_cover_viewport_and_clamp() {
        let mut camera = camera();
        camera.snap_to(176.0, 136.0);
        let rect = camera.visible_tile_bounds(32.0, 20, 15).expect("rect");
        assert_eq!(
            rect,
            TileRect {
                x_min: 0,
                x_max: 10,
                y_min: 0,
                y_max: 7,
            }
        );
        assert!(camera.visible_tile_bounds(32.0, 0, 15).is_none());

        let small = camera.visible_tile_bounds(32.0, 4, 3).expect("small");
        assert_eq!((small.x_max, small.y_max), (3, 2));
    }
}
