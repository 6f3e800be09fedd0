use std::sync::Arc;

use crate::geometry::{Direction, Rect};
use crate::rendering::{draw_placeholder, Canvas, PlaceholderKind, RenderTarget, Rgba, ScreenRect};
use crate::room::{FloorStyle, InteriorRoom};

use super::Layer;

const OUTSIDE: Rgba = [14, 12, 18, 255];
const WALL_FACE: Rgba = [150, 122, 96, 255];
const WALL_TRIM: Rgba = [96, 72, 54, 255];
const EXIT_MAT: Rgba = [120, 44, 40, 255];
const EXIT_MAT_WIDTH_PX: f32 = 48.0;

fn floor_colors(style: FloorStyle) -> (Rgba, Rgba) {
    match style {
        FloorStyle::Wood => ([176, 132, 88, 255], [150, 108, 70, 255]),
        FloorStyle::Stone => ([150, 150, 156, 255], [124, 124, 132, 255]),
        FloorStyle::Carpet => ([112, 64, 92, 255], [100, 56, 82, 255]),
    }
}

fn draw_floor_pattern(canvas: &mut Canvas<'_>, style: FloorStyle, rect: ScreenRect) {
    let (base, seam) = floor_colors(style);
    canvas.fill(rect, base);
    match style {
        FloorStyle::Wood => {
            let board = 8;
            let mut y = rect.y + board;
            let mut row = 0;
            while y < rect.bottom() {
                canvas.fill_rect(rect.x, y, rect.width, 1, seam);
                let stagger = if row % 2 == 0 { 0 } else { 20 };
                let mut x = rect.x + stagger;
                while x < rect.x + rect.width {
                    canvas.fill_rect(x, y - board, 1, board, seam);
                    x += 40;
                }
                y += board;
                row += 1;
            }
        }
        FloorStyle::Stone => {
            let slab = 16;
            let mut y = rect.y;
            while y < rect.bottom() {
                canvas.fill_rect(rect.x, y, rect.width, 1, seam);
                y += slab;
            }
            let mut x = rect.x;
            while x < rect.x + rect.width {
                canvas.fill_rect(x, rect.y, 1, rect.height, seam);
                x += slab;
            }
        }
        FloorStyle::Carpet => {
            canvas.stroke_rect(
                rect.x + 6,
                rect.y + 6,
                rect.width - 12,
                rect.height - 12,
                seam,
            );
        }
    }
}

/// Room floor, walls, exit mat and flat furniture such as rugs.
pub struct InteriorFloorLayer {
    room: Option<Arc<InteriorRoom>>,
    wall_padding: f32,
}

impl InteriorFloorLayer {
    pub fn new(wall_padding: f32) -> Self {
        Self {
            room: None,
            wall_padding,
        }
    }
}

impl Layer for InteriorFloorLayer {
    fn name(&self) -> &'static str {
        "interior_floor"
    }

    fn z_index(&self) -> i32 {
        0
    }

    fn set_room(&mut self, room: Option<&Arc<InteriorRoom>>) {
        self.room = room.cloned();
    }

    fn render(&self, target: &mut RenderTarget<'_>) {
        target.canvas.clear(OUTSIDE);
        let Some(room) = self.room.as_deref() else {
            return;
        };
        let bounds = target.view.rect_to_screen(room.bounds());
        let padding = target.view.scale_len(self.wall_padding);
        let floor = ScreenRect::new(
            bounds.x,
            bounds.y + padding,
            bounds.width,
            bounds.height - padding,
        );
        draw_floor_pattern(&mut target.canvas, room.floor, floor);

        let canvas = &mut target.canvas;
        canvas.fill_rect(bounds.x, bounds.y, bounds.width, padding, WALL_FACE);
        canvas.fill_rect(bounds.x, bounds.y + padding - 2, bounds.width, 2, WALL_TRIM);
        canvas.stroke_rect(bounds.x, bounds.y, bounds.width, bounds.height, WALL_TRIM);

        let mat = target.view.rect_to_screen(Rect::new(
            (room.width - EXIT_MAT_WIDTH_PX) * 0.5,
            room.height - self.wall_padding * 0.5,
            EXIT_MAT_WIDTH_PX,
            self.wall_padding * 0.5,
        ));
        target.canvas.fill(mat, EXIT_MAT);

        for piece in room.furniture.iter().filter(|piece| piece.kind.is_flat()) {
            let rect = target.view.rect_to_screen(piece.bounds());
            if target.draw_sprite(piece.sprite_id.as_deref(), rect) {
                continue;
            }
            draw_placeholder(
                &mut target.canvas,
                PlaceholderKind::Furniture(piece.kind),
                rect,
                &room.id,
                Direction::Down,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::rendering::{SpriteCache, ViewTransform};
    use crate::room::{Furniture, FurnitureKind};

    fn room() -> Arc<InteriorRoom> {
        Arc::new(InteriorRoom {
            id: "inn".to_string(),
            name: "Inn".to_string(),
            width: 160.0,
            height: 120.0,
            floor: FloorStyle::Stone,
            furniture: vec![Furniture {
                kind: FurnitureKind::Rug,
                x: 40.0,
                y: 50.0,
                width: 60.0,
                height: 30.0,
                sprite_id: None,
            }],
        })
    }

    fn render(layer: &InteriorFloorLayer, frame: &mut [u8]) {
        let mut sprites = SpriteCache::new(None);
        let camera = Camera::new(200.0, 160.0, 0.1);
        let mut target = RenderTarget {
            canvas: Canvas::new(frame, 200, 160),
            sprites: &mut sprites,
            camera: &camera,
            view: ViewTransform::centered(160.0, 120.0, 200, 160),
            tile_size: 32.0,
            clock_ms: 0.0,
        };
        layer.render(&mut target);
    }

    #[test]
    fn clears_outside_and_draws_floor_inside() {
        let mut layer = InteriorFloorLayer::new(24.0);
        layer.set_room(Some(&room()));
        let mut frame = vec![0u8; 200 * 160 * 4];
        render(&layer, &mut frame);
        assert_eq!(&frame[0..4], &OUTSIDE);
        // Room spans x 20..180, y 20..140; sample the top wall band.
        let wall = ((25 * 200) + 100) * 4;
        assert_eq!(&frame[wall..wall + 4], &WALL_FACE);
    }

    #[test]
    fn without_room_only_clears() {
        let layer = InteriorFloorLayer::new(24.0);
        let mut frame = vec![9u8; 200 * 160 * 4];
        render(&layer, &mut frame);
        assert!(frame.chunks_exact(4).all(|pixel| pixel == OUTSIDE));
    }
}
